//! Path-to-URL direction: translate a local path inside a synchronized
//! folder into a share URL in the requested style.

use std::env;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use url::Url;

use super::{UrlStyle, encoding};
use crate::config::{Config, Folder};

const WEBDAV_SUFFIX: &str = "/remote.php/webdav/";
const INDEX_PHP_SUFFIX: &str = "/index.php";

/// Resolve a local path (or `file://` URL) to a share URL.
///
/// Returns `None` when the path lies outside every synchronized folder.
/// The path does not have to exist; an existing directory gets a trailing
/// separator so that it cannot prefix-match a same-named file.
pub fn resolve_path(config: &Config, input: &str, style: UrlStyle) -> Option<String> {
    let input = if input.starts_with("file://") {
        file_url_to_path(input)?
    } else {
        input.to_string()
    };

    let mut absolute = absolutize(&input);
    if Path::new(&absolute).is_dir() && !absolute.ends_with(MAIN_SEPARATOR) {
        absolute.push(MAIN_SEPARATOR);
    }
    tracing::debug!(%input, %absolute, "resolving local path");

    let (base_url, folder) = match_local(config, &absolute)?;

    let relative = absolute[folder.local_path.len()..].trim_matches(MAIN_SEPARATOR);
    let mut segments: Vec<&str> =
        folder.target_path.split('/').filter(|s| !s.is_empty()).collect();
    segments.extend(relative.split(MAIN_SEPARATOR).filter(|s| !s.is_empty()));

    let url = match style {
        UrlStyle::Webdav => webdav_url(base_url, &segments),
        UrlStyle::WebClient => {
            webclient_url(base_url, &segments, absolute.ends_with(MAIN_SEPARATOR))
        }
    };
    Some(url)
}

/// Longest-prefix match of the absolute path against the configured folders
/// of every account. Deterministic counterpart of the sync client's
/// unordered folder map.
fn match_local<'c>(config: &'c Config, absolute: &str) -> Option<(&'c str, &'c Folder)> {
    let mut best: Option<(&str, &Folder)> = None;
    for account in &config.accounts {
        for folder in &account.folders {
            let mut prefix = folder.local_path.clone();
            prefix.push(MAIN_SEPARATOR);
            if absolute.starts_with(&prefix)
                && best.map_or(true, |(_, b)| folder.local_path.len() > b.local_path.len())
            {
                best = Some((account.base_url.as_str(), folder));
            }
        }
    }
    if best.is_none() {
        tracing::debug!(path = absolute, "path is outside every synchronized folder");
    }
    best
}

/// Convert a `file://` URL to a native path.
fn file_url_to_path(input: &str) -> Option<String> {
    let parsed = match Url::parse(input) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(input, error = %err, "unparsable file URL");
            return None;
        }
    };
    match parsed.to_file_path() {
        Ok(path) => Some(path.to_string_lossy().into_owned()),
        Err(()) => {
            tracing::warn!(input, "file URL has no local path form");
            None
        }
    }
}

/// Lexically absolutize against the current directory; `.` and `..`
/// components are folded away without touching the filesystem.
fn absolutize(input: &str) -> String {
    let path = Path::new(input);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().into_owned()
}

fn webdav_url(base_url: &str, segments: &[&str]) -> String {
    let encoded: Vec<String> =
        segments.iter().map(|segment| encoding::encode_segment(segment)).collect();
    format!("{base_url}{WEBDAV_SUFFIX}{}", encoded.join("/"))
}

fn webclient_url(base_url: &str, segments: &[&str], is_dir: bool) -> String {
    let mut url = base_url.to_string();
    if !url.ends_with(INDEX_PHP_SUFFIX) {
        url.push_str(INDEX_PHP_SUFFIX);
    }
    match segments.split_last() {
        // a directory always gets the listing form, never the download form
        Some((file, parents)) if !is_dir => format!(
            "{url}/apps/files/ajax/download.php?dir={}&files={}",
            encoding::encode_query(&join_remote(parents)),
            encoding::encode_query(file),
        ),
        _ => format!("{url}/apps/files/?dir={}", encoding::encode_query(&join_remote(segments))),
    }
}

fn join_remote(segments: &[&str]) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
