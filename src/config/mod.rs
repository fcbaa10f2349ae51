use std::collections::BTreeMap;
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// One synchronized folder pairing a local directory with a remote path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Absolute local filesystem path, no trailing separator
    pub local_path: String,
    /// Absolute remote path with a leading slash and no trailing slash;
    /// the server root is stored as the empty string
    pub target_path: String,
}

/// One configured connection to an ownCloud server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Absolute HTTP(S) base URL of the server, no trailing slash
    pub base_url: String,
    /// Synchronized folders of this account
    pub folders: Vec<Folder>,
}

/// The validated, immutable set of configured accounts
///
/// Built once from the sync client's `owncloud.cfg`; resolution queries
/// never mutate it. An empty configuration is a normal state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub accounts: Vec<Account>,
}

/// Collects raw key/value fields for one account before validation
#[derive(Debug, Default)]
struct AccountBuilder {
    base_url: Option<String>,
    folders: BTreeMap<String, FolderBuilder>,
}

/// Collects raw key/value fields for one folder before validation
#[derive(Debug, Default)]
struct FolderBuilder {
    local_path: Option<String>,
    target_path: Option<String>,
}

impl Config {
    /// Default location of the sync client's configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ownCloud").join("owncloud.cfg"))
    }

    /// Load the configuration from `path`, or from the default location.
    ///
    /// A missing or unreadable file yields an empty configuration; the
    /// resolver treats "no accounts" as a normal queryable state.
    pub fn load(path: Option<&Path>) -> Config {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                tracing::debug!("no configuration directory on this system");
                return Config::default();
            }
        };

        tracing::debug!(path = %path.display(), "reading configuration");

        match fs::read(&path) {
            Ok(bytes) => Config::parse(&String::from_utf8_lossy(&bytes)),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "configuration not readable, treating as empty");
                Config::default()
            }
        }
    }

    /// Parse an ini-style configuration document.
    ///
    /// Only the `[Accounts]` section is consulted. Its keys are
    /// case-insensitive component paths (components separated by `\` or `.`):
    ///
    /// * `<account>\url` — the account's base URL
    /// * `<account>\Folders\<id>\localPath` — a folder's local directory
    /// * `<account>\Folders\<id>\targetPath` — a folder's remote path
    ///
    /// Any other key shape is ignored. After all keys are consumed a single
    /// validation pass drops folders missing either path and accounts
    /// missing their base URL.
    pub fn parse(text: &str) -> Config {
        let mut builders: BTreeMap<String, AccountBuilder> = BTreeMap::new();
        let mut in_accounts = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                in_accounts = section.trim().eq_ignore_ascii_case("accounts");
                continue;
            }
            if !in_accounts {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            apply_key(&mut builders, key.trim(), value.trim());
        }

        Config {
            accounts: builders.into_values().filter_map(AccountBuilder::validate).collect(),
        }
    }
}

/// Route one raw `[Accounts]` key into the account builders.
fn apply_key(builders: &mut BTreeMap<String, AccountBuilder>, key: &str, value: &str) {
    let components: Vec<&str> = key.split(['\\', '.']).collect();

    match components.as_slice() {
        [account, field] if field.eq_ignore_ascii_case("url") => {
            builders.entry(account.to_string()).or_default().base_url = Some(value.to_string());
        }
        [account, folders, id, field] if folders.eq_ignore_ascii_case("folders") => {
            let folder = builders
                .entry(account.to_string())
                .or_default()
                .folders
                .entry(id.to_string())
                .or_default();
            if field.eq_ignore_ascii_case("localpath") {
                folder.local_path = Some(value.to_string());
            } else if field.eq_ignore_ascii_case("targetpath") {
                folder.target_path = Some(value.to_string());
            }
        }
        _ => {
            tracing::trace!(key, "ignoring unrecognized configuration key");
        }
    }
}

impl AccountBuilder {
    /// Validate and canonicalize, or discard the whole account.
    fn validate(self) -> Option<Account> {
        let base_url = match self.base_url.as_deref().map(canonical_base_url) {
            Some(url) if !url.is_empty() => url,
            _ => {
                tracing::debug!("dropping account without a base URL");
                return None;
            }
        };

        let folders: Vec<Folder> =
            self.folders.into_iter().filter_map(|(id, folder)| folder.validate(&id)).collect();

        Some(Account { base_url, folders })
    }
}

impl FolderBuilder {
    /// Validate and canonicalize, or discard this folder mapping.
    fn validate(self, id: &str) -> Option<Folder> {
        match (self.local_path, self.target_path) {
            (Some(local), Some(target)) => Some(Folder {
                local_path: canonical_local_path(&local),
                target_path: canonical_target_path(&target),
            }),
            _ => {
                tracing::debug!(folder = id, "dropping incomplete folder mapping");
                None
            }
        }
    }
}

fn canonical_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn canonical_local_path(path: &str) -> String {
    path.trim_end_matches(MAIN_SEPARATOR).to_string()
}

/// Leading slash, no trailing slash; the root path `/` collapses to "".
fn canonical_target_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
[General]
clientVersion=2.5.1

[Accounts]
0\url=https://cloud.example.com/
0\version=1
0\Folders\1\localPath=/home/u/ownCloud/
0\Folders\1\targetPath=/
0\Folders\1\ignoreHiddenFiles=true
1\url=https://other.example.com
1\Folders\1\localPath=/home/u/Work
1\Folders\1\targetPath=/Teams/Work/
version=2
";

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE);
        assert_eq!(config.accounts.len(), 2);

        let first = &config.accounts[0];
        assert_eq!(first.base_url, "https://cloud.example.com");
        assert_eq!(first.folders, vec![Folder {
            local_path: "/home/u/ownCloud".to_string(),
            target_path: String::new(),
        }]);

        let second = &config.accounts[1];
        assert_eq!(second.base_url, "https://other.example.com");
        assert_eq!(second.folders[0].target_path, "/Teams/Work");
    }

    #[test]
    fn test_parse_dotted_and_case_insensitive_keys() {
        let config = Config::parse(
            "[accounts]\n0.URL=https://host\n0.FOLDERS.a.LOCALPATH=/data\n0.Folders.a.TargetPath=Docs\n",
        );
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].folders[0].local_path, "/data");
        // a missing leading slash is repaired during canonicalization
        assert_eq!(config.accounts[0].folders[0].target_path, "/Docs");
    }

    #[test]
    fn test_incomplete_folder_is_pruned() {
        let config = Config::parse(
            "[Accounts]\n0\\url=https://host\n0\\Folders\\1\\localPath=/data\n",
        );
        assert_eq!(config.accounts.len(), 1);
        assert!(config.accounts[0].folders.is_empty());
    }

    #[test]
    fn test_account_without_url_is_pruned() {
        let config = Config::parse(
            "[Accounts]\n0\\Folders\\1\\localPath=/data\n0\\Folders\\1\\targetPath=/Docs\n",
        );
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_keys_outside_accounts_section_are_ignored() {
        let config = Config::parse("[General]\n0\\url=https://host\n");
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(Config::parse(""), Config::default());
    }

    #[test]
    fn test_load_missing_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("does-not-exist.cfg")));
        assert!(config.accounts.is_empty());
    }
}
