use std::fs;

use oclink::config::Config;
use oclink::resolver::{UrlStyle, resolve_either, resolve_path, resolve_url};

/// Build a one-account configuration whose folder is backed by a real
/// temporary directory, so directory detection behaves as in production.
fn fixture() -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Projects").join("demo")).unwrap();
    fs::write(dir.path().join("Projects").join("report final.txt"), b"x").unwrap();

    let document = format!(
        "[Accounts]\n\
         0\\url=https://cloud.example.com/\n\
         0\\Folders\\1\\localPath={}\n\
         0\\Folders\\1\\targetPath=/Sync\n",
        dir.path().display()
    );
    let config = Config::parse(&document);
    (dir, config)
}

#[test]
fn test_round_trip_file_webdav() {
    let (dir, config) = fixture();
    let local = dir.path().join("Projects").join("report final.txt");
    let local = local.to_string_lossy();

    let url = resolve_path(&config, &local, UrlStyle::Webdav).unwrap();
    assert_eq!(
        url,
        "https://cloud.example.com/remote.php/webdav/Sync/Projects/report%20final.txt"
    );
    assert_eq!(resolve_url(&config, &url).unwrap(), local);
}

#[test]
fn test_round_trip_file_webclient() {
    let (dir, config) = fixture();
    let local = dir.path().join("Projects").join("report final.txt");
    let local = local.to_string_lossy();

    let url = resolve_path(&config, &local, UrlStyle::WebClient).unwrap();
    assert_eq!(
        url,
        "https://cloud.example.com/index.php/apps/files/ajax/download.php\
         ?dir=%2FSync%2FProjects&files=report+final.txt"
    );
    assert_eq!(resolve_url(&config, &url).unwrap(), local);
}

#[test]
fn test_round_trip_directory_webclient() {
    let (dir, config) = fixture();
    let local = dir.path().join("Projects").join("demo");
    let local = local.to_string_lossy();

    let url = resolve_path(&config, &local, UrlStyle::WebClient).unwrap();
    assert_eq!(
        url,
        "https://cloud.example.com/index.php/apps/files/?dir=%2FSync%2FProjects%2Fdemo"
    );
    assert_eq!(resolve_url(&config, &url).unwrap(), local);
}

#[test]
fn test_round_trip_through_dispatcher() {
    let (dir, config) = fixture();
    let local = dir.path().join("Projects").join("demo");
    let local = local.to_string_lossy();

    let url = resolve_either(&config, &local, UrlStyle::Webdav).unwrap();
    let back = resolve_either(&config, &url, UrlStyle::Webdav).unwrap();
    assert_eq!(back, local);
}

#[test]
fn test_path_outside_sync_folder_is_absent() {
    let (_dir, config) = fixture();
    let other = tempfile::tempdir().unwrap();
    let outside = other.path().join("a.txt");
    assert_eq!(resolve_path(&config, &outside.to_string_lossy(), UrlStyle::Webdav), None);
}
