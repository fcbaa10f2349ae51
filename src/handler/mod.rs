//! Session URL-handler registration: writes or removes the freedesktop
//! `.desktop` descriptor that routes `owncloud+` URLs to this binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

const DESKTOP_FILE: &str = "owncloud-url.desktop";

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("could not determine the applications directory")]
    NoApplicationsDir,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write the URL-handler descriptor, overwriting any previous one, and
/// refresh the desktop application database.
pub fn register(desktop_path: Option<PathBuf>) -> Result<(), HandlerError> {
    let path = match desktop_path {
        Some(path) => path,
        None => default_path()?,
    };
    tracing::info!(path = %path.display(), "writing URL handler descriptor");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| HandlerError::Write {
            path: path.clone(),
            source,
        })?;
    }
    fs::write(&path, descriptor_contents()).map_err(|source| HandlerError::Write {
        path: path.clone(),
        source,
    })?;

    refresh_database(&path);
    Ok(())
}

/// Remove the URL-handler descriptor if present and refresh the desktop
/// application database.
pub fn unregister(desktop_path: Option<PathBuf>) -> Result<(), HandlerError> {
    let path = match desktop_path {
        Some(path) => path,
        None => default_path()?,
    };
    tracing::info!(path = %path.display(), "removing URL handler descriptor");

    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(HandlerError::Remove { path, source }),
    }

    refresh_database(&path);
    Ok(())
}

fn default_path() -> Result<PathBuf, HandlerError> {
    dirs::data_dir()
        .map(|dir| dir.join("applications").join(DESKTOP_FILE))
        .ok_or(HandlerError::NoApplicationsDir)
}

fn descriptor_contents() -> String {
    let exe = env::current_exe()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string());
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Exec={exe} --run xdg-open %u\n\
         Name=ownCloud URL handler\n\
         NoDisplay=true\n\
         MimeType=x-scheme-handler/owncloud+http;x-scheme-handler/owncloud+https;x-scheme-handler/owncloud;\n\
         X-KDE-Protocols=owncloud+http;owncloud+https;owncloud\n"
    )
}

/// Best effort; a missing update-desktop-database is not fatal.
fn refresh_database(path: &Path) {
    let Some(dir) = path.parent() else { return };
    match Command::new("update-desktop-database").arg(dir).status() {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!(%status, "update-desktop-database reported failure"),
        Err(err) => tracing::warn!(error = %err, "could not run update-desktop-database"),
    }
}
