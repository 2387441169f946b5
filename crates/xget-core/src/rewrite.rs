//! Proxy URL rewriting
//!
//! An eligible URL `https://<platform host><tail>` becomes
//! `https://<proxy domain>/<platform key><tail>`, where the tail (path, query
//! and fragment) is copied byte for byte. The proxy server depends on this
//! exact shape.

use log::warn;

use crate::platform::Registry;
use crate::settings::{validate_proxy_domain, Settings};
use crate::url::parse_absolute;

/// Builds proxied URLs for links on registered platforms.
pub struct Rewriter<'r> {
    registry: &'r Registry,
}

impl<'r> Rewriter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Proxied form of `url`, or `None` when the URL is not eligible under
    /// `settings`.
    pub fn rewrite(&self, url: &str, settings: &Settings) -> Option<String> {
        if !settings.enabled {
            return None;
        }
        let domain = settings.proxy_domain()?;

        let key = self.registry.detect(url)?;
        if !settings.platform_enabled(key) {
            return None;
        }

        let domain = match validate_proxy_domain(domain) {
            Ok(domain) => domain,
            Err(e) => {
                warn!("rewrite: {}", e);
                return None;
            }
        };

        let parts = match parse_absolute(url) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("rewrite: invalid url {:?}: {}", url, e);
                return None;
            }
        };

        Some(format!("https://{}/{}{}", domain, key, parts.tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlatformKey;
    use crate::url::extract_tail;

    fn settings() -> Settings {
        let mut settings = Settings::with_domain("mirror.example");
        settings.set_platform(PlatformKey::Gl, false);
        settings
    }

    fn rewrite(url: &str, settings: &Settings) -> Option<String> {
        let registry = Registry::builtin();
        Rewriter::new(&registry).rewrite(url, settings)
    }

    #[test]
    fn test_rewrite_github_release_asset() {
        let settings: Settings = serde_json::from_str(
            r#"{"enabled":true,"xgetDomain":"mirror.example","enabledPlatforms":{"gh":true}}"#,
        )
        .unwrap();
        assert_eq!(
            rewrite("https://github.com/o/r/releases/download/v1/a.zip", &settings).as_deref(),
            Some("https://mirror.example/gh/o/r/releases/download/v1/a.zip")
        );
    }

    #[test]
    fn test_rewrite_keeps_query_fragment_and_case() {
        assert_eq!(
            rewrite(
                "https://huggingface.co/Org/Model/resolve/main/Weights%20v2.bin?download=true#x",
                &settings()
            )
            .as_deref(),
            Some("https://mirror.example/hf/Org/Model/resolve/main/Weights%20v2.bin?download=true#x")
        );
        assert_eq!(
            rewrite("https://github.com/o/r/releases/", &settings()).as_deref(),
            Some("https://mirror.example/gh/o/r/releases/")
        );
    }

    #[test]
    fn test_rewrite_tail_round_trip() {
        let registry = Registry::builtin();
        let rewriter = Rewriter::new(&registry);
        let settings = settings();
        for url in [
            "https://github.com/o/r/raw/main/a%2Fb.txt",
            "https://github.com/o/r/archive/v1.tar.gz?x=1&y=%20",
            "https://huggingface.co/d/resolve/main/f.json#L1",
            "https://github.com",
        ] {
            let out = rewriter.rewrite(url, &settings).unwrap();
            let prefix = "https://mirror.example/".len() + 2;
            assert_eq!(&out[prefix..], extract_tail(url), "{}", url);
        }
    }

    #[test]
    fn test_disabled_settings_never_rewrite() {
        let mut off = settings();
        off.enabled = false;
        for url in [
            "https://github.com/o/r/releases/download/v1/a.zip",
            "https://huggingface.co/o/m/resolve/main/w.bin",
            "https://example.com/a.zip",
        ] {
            assert_eq!(rewrite(url, &off), None);
        }

        let mut unconfigured = settings();
        unconfigured.xget_domain = None;
        assert_eq!(rewrite("https://github.com/o/r/raw/main/x", &unconfigured), None);
    }

    #[test]
    fn test_not_eligible() {
        // Platform switched off
        assert_eq!(rewrite("https://gitlab.com/g/p/-/archive/main/p.zip", &settings()), None);
        // Not a platform
        assert_eq!(rewrite("https://example.com/a.zip", &settings()), None);
        // Not https
        assert_eq!(rewrite("http://github.com/o/r/raw/main/x", &settings()), None);
        // Malformed
        assert_eq!(rewrite("github.com/o/r", &settings()), None);
    }

    #[test]
    fn test_invalid_proxy_domain() {
        let settings = Settings::with_domain("mirror.example/path");
        assert_eq!(rewrite("https://github.com/o/r/raw/main/x", &settings), None);
    }

    #[test]
    fn test_rewrite_is_deterministic() {
        let registry = Registry::builtin();
        let rewriter = Rewriter::new(&registry);
        let settings = settings();
        let url = "https://github.com/o/r/releases/download/v1/a.zip";
        let first = rewriter.rewrite(url, &settings);
        assert!(first.is_some());
        for _ in 0..3 {
            assert_eq!(rewriter.rewrite(url, &settings), first);
        }
    }
}
