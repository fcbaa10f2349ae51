pub mod encoding;
pub mod path;
pub mod url;

pub use path::resolve_path;
pub use url::resolve_url;

use crate::config::Config;

/// Scheme marker the sync client wraps share URLs in (`owncloud+https://...`)
pub const SCHEME_PREFIX: &str = "owncloud+";

/// Output URL style for the path-to-URL direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    /// `.../index.php/apps/files/...` links for the web UI
    WebClient,
    /// `.../remote.php/webdav/...` links
    Webdav,
}

/// Resolve in whichever direction the shape of `input` calls for.
///
/// Inputs carrying the `owncloud+` scheme marker or a bare `http(s)` scheme
/// are translated URL-to-path; everything else is treated as a local path
/// and translated path-to-URL in the requested `style`.
pub fn resolve_either(config: &Config, input: &str, style: UrlStyle) -> Option<String> {
    if input.starts_with(SCHEME_PREFIX) || input.starts_with("http:") || input.starts_with("https:")
    {
        resolve_url(config, input)
    } else {
        resolve_path(config, input, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Account, Folder};

    fn config() -> Config {
        Config {
            accounts: vec![Account {
                base_url: "https://host".to_string(),
                folders: vec![Folder {
                    local_path: "/home/u/Docs".to_string(),
                    target_path: "/Docs".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn test_url_inputs_go_to_the_url_direction() {
        let expected = Some("/home/u/Docs/a.txt".to_string());
        for input in [
            "https://host/remote.php/webdav/Docs/a.txt",
            "owncloud+https://host/remote.php/webdav/Docs/a.txt",
        ] {
            assert_eq!(resolve_either(&config(), input, UrlStyle::Webdav), expected);
        }
    }

    #[test]
    fn test_path_inputs_go_to_the_path_direction() {
        let url = resolve_either(&config(), "/home/u/Docs/a.txt", UrlStyle::Webdav);
        assert_eq!(url, Some("https://host/remote.php/webdav/Docs/a.txt".to_string()));
    }
}
