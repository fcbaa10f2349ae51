//! URL-to-path direction: translate a share URL of any supported dialect
//! into the local path of the synchronized file.

use std::path::PathBuf;

use url::form_urlencoded;

use super::{SCHEME_PREFIX, encoding};
use crate::config::{Account, Config, Folder};

const WEBDAV_PREFIX: &str = "/remote.php/webdav";
const INDEX_PHP: &str = "/index.php";

/// One recognized URL shape and how to pull the remote path out of it.
///
/// The matchers are tried in order; adding a dialect is one more row.
struct Dialect {
    name: &'static str,
    extract: fn(&str) -> Extraction,
}

enum Extraction {
    /// The remainder is not this dialect.
    Miss,
    /// Remote path extracted.
    Path(String),
    /// The remainder is this dialect but structurally unusable.
    Malformed(&'static str),
}

const DIALECTS: &[Dialect] = &[
    Dialect { name: "webdav", extract: extract_webdav },
    Dialect { name: "listing", extract: extract_listing },
    Dialect { name: "download", extract: extract_download },
];

/// Resolve a share URL to the local path of the file it denotes.
///
/// Returns `None` when no configured account or folder covers the URL, or
/// when the URL matches no known dialect; not-found is never an error.
pub fn resolve_url(config: &Config, url: &str) -> Option<String> {
    let url = url.strip_prefix(SCHEME_PREFIX).unwrap_or(url);

    let Some((account, remainder)) = match_account(config, url) else {
        tracing::debug!(url, "no configured account matches this URL");
        return None;
    };

    // presentation-layer prefix used by the web UI dialects
    let remainder = strip_index_php(remainder).unwrap_or(remainder);

    let remote = match extract_remote_path(remainder, url)? {
        remote if remote.starts_with('/') => remote,
        remote => format!("/{remote}"),
    };

    let Some(folder) = match_folder(account, &remote) else {
        tracing::debug!(url, %remote, "no synchronized folder covers this remote path");
        return None;
    };

    Some(join_local(&folder.local_path, &remote[folder.target_path.len()..]))
}

/// Run the ordered dialect matchers over the post-base-URL remainder.
fn extract_remote_path(remainder: &str, url: &str) -> Option<String> {
    for dialect in DIALECTS {
        match (dialect.extract)(remainder) {
            Extraction::Miss => continue,
            Extraction::Path(remote) => {
                tracing::debug!(dialect = dialect.name, %remote, "extracted remote path");
                return Some(remote);
            }
            Extraction::Malformed(reason) => {
                tracing::warn!(dialect = dialect.name, url, reason, "unusable URL");
                return None;
            }
        }
    }
    tracing::warn!(url, "URL matches no known dialect");
    None
}

/// Direct-path dialect: `/remote.php/webdav/<encoded remote path>`.
fn extract_webdav(remainder: &str) -> Extraction {
    match remainder.strip_prefix(WEBDAV_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            Extraction::Path(encoding::decode_plus(rest))
        }
        _ => Extraction::Miss,
    }
}

/// Listing-query dialect: `apps/files/?dir=<remote path>`.
fn extract_listing(remainder: &str) -> Extraction {
    let rest = remainder.strip_prefix('/').unwrap_or(remainder);
    let query = match rest
        .strip_prefix("apps/files?")
        .or_else(|| rest.strip_prefix("apps/files/?"))
    {
        Some(query) => query,
        None => return Extraction::Miss,
    };
    match query_param(query, "dir") {
        Some(dir) => Extraction::Path(dir),
        None => Extraction::Malformed("missing dir parameter"),
    }
}

/// Download-query dialect: `apps/files/ajax/download.php?dir=..&files=..`.
fn extract_download(remainder: &str) -> Extraction {
    let rest = remainder.strip_prefix('/').unwrap_or(remainder);
    let query = match rest.strip_prefix("apps/files/ajax/download.php?") {
        Some(query) => query,
        None => return Extraction::Miss,
    };
    match (query_param(query, "dir"), query_param(query, "files")) {
        (Some(dir), Some(files)) => {
            Extraction::Path(format!("{}/{}", dir.trim_end_matches('/'), files))
        }
        _ => Extraction::Malformed("missing dir or files parameter"),
    }
}

/// First occurrence of a query parameter, form-urlencoded-decoded.
fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Longest-prefix match of the URL against the configured base URLs.
///
/// The sync client's own config gives no ordering guarantee between
/// accounts, so overlapping base URLs are tie-broken deterministically in
/// favor of the longest one.
fn match_account<'c, 'u>(config: &'c Config, url: &'u str) -> Option<(&'c Account, &'u str)> {
    let mut best: Option<(&Account, &str)> = None;
    for account in &config.accounts {
        let remainder = match url.strip_prefix(account.base_url.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => continue,
        };
        if best.map_or(true, |(b, _)| account.base_url.len() > b.base_url.len()) {
            best = Some((account, remainder));
        }
    }
    best
}

fn strip_index_php(remainder: &str) -> Option<&str> {
    match remainder.strip_prefix(INDEX_PHP) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

/// Longest-prefix match of the remote path against the account's folders.
fn match_folder<'a>(account: &'a Account, remote: &str) -> Option<&'a Folder> {
    let mut best: Option<&Folder> = None;
    for folder in &account.folders {
        let target = folder.target_path.as_str();
        let matches = remote == target
            || remote.strip_prefix(target).is_some_and(|rest| rest.starts_with('/'));
        if matches && best.map_or(true, |b| target.len() > b.target_path.len()) {
            best = Some(folder);
        }
    }
    best
}

/// Join the already-decoded remote remainder onto the folder's local path.
fn join_local(local: &str, remainder: &str) -> String {
    let mut path = PathBuf::from(local);
    for segment in remainder.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.to_string_lossy().into_owned()
}
