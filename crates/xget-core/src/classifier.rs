//! Download Link Classifier
//!
//! Decides whether a clicked link is a file the user means to fetch. The
//! heuristics run in a fixed order and the first one with an opinion wins:
//!
//! 1. `download` attribute
//! 2. file extension allow-list
//! 3. host-specific path rules (including forced negatives)
//! 4. download-intent link text
//!
//! Broad rules come last so the host rules can veto them.

use log::{debug, warn};

use crate::platform::Registry;
use crate::types::{Classification, ClassificationInput, Reason, Verdict};
use crate::url::{parse_absolute, UrlError};

/// Path suffixes that mark a downloadable file.
pub const FILE_EXTENSIONS: &[&str] = &[
    // Archives
    ".zip", ".tar.gz", ".tar.bz2", ".tar.xz", ".7z", ".rar", ".gz", ".bz2",
    // Installers and disk images
    ".exe", ".msi", ".dmg", ".pkg", ".deb", ".rpm", ".apk", ".iso", ".img",
    // Packages
    ".jar", ".war", ".ear", ".whl", ".egg", ".gem", ".nupkg",
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // Media
    ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".mp3", ".wav", ".flac", ".ogg",
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".svg",
];

/// Link texts that announce a download. Matched exactly or as a prefix
/// followed by a space.
pub const DOWNLOAD_PHRASES: &[&str] = &["download", "download file", "get file"];

/// Per-click view shared by all heuristics.
struct LinkView<'a> {
    has_download_attribute: bool,
    text: &'a str,
    /// Host with port, when the url parsed
    host: Option<&'a str>,
    /// Lowercased path, when the url parsed
    path: Option<String>,
}

type Heuristic = fn(&Registry, &LinkView<'_>) -> Option<(Verdict, Reason)>;

/// Evaluation order. Do not reorder.
const HEURISTICS: &[Heuristic] = &[
    check_download_attribute,
    check_file_extension,
    check_host_rules,
    check_link_text,
];

/// Stateless link classifier over a platform registry.
pub struct Classifier<'r> {
    registry: &'r Registry,
}

impl<'r> Classifier<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Is this a download link?
    pub fn is_download(&self, input: &ClassificationInput<'_>) -> bool {
        self.classify(input).is_download
    }

    /// Classify a link and report which heuristic decided.
    pub fn classify(&self, input: &ClassificationInput<'_>) -> Classification {
        let (host, path) = match parse_absolute(input.url) {
            Ok(parts) => (Some(parts.host_with_port), Some(parts.path.to_lowercase())),
            // mailto:, tel:, javascript: and friends
            Err(UrlError::MissingScheme) => {
                debug!("classify: non-hierarchical url {:?}", input.url);
                (None, None)
            }
            Err(e) => {
                warn!("classify: invalid url {:?}: {}", input.url, e);
                (None, None)
            }
        };
        let view = LinkView {
            has_download_attribute: input.has_download_attribute,
            text: input.text,
            host,
            path,
        };

        for heuristic in HEURISTICS {
            match heuristic(self.registry, &view) {
                Some((Verdict::Download, reason)) => {
                    return Classification { is_download: true, reason };
                }
                Some((Verdict::NotDownload, reason)) => {
                    return Classification { is_download: false, reason };
                }
                Some((Verdict::Abstain, _)) | None => {}
            }
        }

        Classification {
            is_download: false,
            reason: Reason::NoSignal,
        }
    }
}

fn check_download_attribute(_: &Registry, view: &LinkView<'_>) -> Option<(Verdict, Reason)> {
    view.has_download_attribute
        .then_some((Verdict::Download, Reason::DownloadAttribute))
}

fn check_file_extension(_: &Registry, view: &LinkView<'_>) -> Option<(Verdict, Reason)> {
    let path = view.path.as_deref()?;
    FILE_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| path.ends_with(ext))
        .map(|ext| (Verdict::Download, Reason::FileExtension(ext)))
}

fn check_host_rules(registry: &Registry, view: &LinkView<'_>) -> Option<(Verdict, Reason)> {
    let desc = registry.by_host(view.host?)?;
    let path = view.path.as_deref()?;

    desc.link_rules.iter().find_map(|rule| match rule.evaluate(path) {
        Verdict::Download => Some((Verdict::Download, Reason::HostPattern(desc.key))),
        Verdict::NotDownload => Some((Verdict::NotDownload, Reason::ReleasesListing(desc.key))),
        Verdict::Abstain => None,
    })
}

fn check_link_text(_: &Registry, view: &LinkView<'_>) -> Option<(Verdict, Reason)> {
    let text = view.text.trim().to_lowercase();
    DOWNLOAD_PHRASES
        .iter()
        .copied()
        .find(|phrase| {
            text == *phrase
                || text
                    .strip_prefix(phrase)
                    .is_some_and(|rest| rest.starts_with(' '))
        })
        .map(|phrase| (Verdict::Download, Reason::LinkText(phrase)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlatformKey;

    fn classify(url: &str, attr: bool, text: &str) -> Classification {
        let registry = Registry::builtin();
        Classifier::new(&registry).classify(&ClassificationInput::new(url, attr, text))
    }

    fn is_download(url: &str, attr: bool, text: &str) -> bool {
        classify(url, attr, text).is_download
    }

    #[test]
    fn test_download_attribute_wins() {
        let c = classify("https://example.com/page", true, "");
        assert_eq!(c, Classification { is_download: true, reason: Reason::DownloadAttribute });
        // Even over a releases listing
        assert!(is_download("https://github.com/o/r/releases", true, ""));
        // Even on a broken url
        assert!(is_download("not a url", true, ""));
    }

    #[test]
    fn test_file_extensions() {
        assert_eq!(
            classify("https://example.com/dist/file.tar.gz", false, "").reason,
            Reason::FileExtension(".tar.gz")
        );
        assert!(is_download("https://example.com/Setup.EXE", false, ""));
        assert!(is_download("https://example.com/a/report.pdf?inline=1", false, ""));
        assert!(!is_download("https://example.com/page.html", false, ""));
        // Query strings are not part of the path
        assert!(!is_download("https://example.com/view?file=a.zip", false, ""));
    }

    #[test]
    fn test_every_extension_is_recognised() {
        for ext in FILE_EXTENSIONS {
            let url = format!("https://example.com/asset{}", ext);
            assert!(is_download(&url, false, ""), "{} not classified", ext);
        }
    }

    #[test]
    fn test_github_patterns() {
        assert_eq!(
            classify("https://github.com/org/repo/releases/download/v1/asset.bin", false, "").reason,
            Reason::HostPattern(PlatformKey::Gh)
        );
        assert!(is_download("https://github.com/o/r/archive/refs/tags/v1.0.zip", false, ""));
        assert!(is_download("https://github.com/o/r/raw/main/install.sh", false, ""));
        assert!(!is_download("https://github.com/o/r/archive/refs/tags/v1.0", false, ""));
        assert!(!is_download("https://github.com/o/r/blob/main/install.sh", false, ""));
    }

    #[test]
    fn test_github_releases_listing_is_forced_negative() {
        let c = classify("https://github.com/org/repo/releases", false, "Download");
        assert_eq!(
            c,
            Classification { is_download: false, reason: Reason::ReleasesListing(PlatformKey::Gh) }
        );
        assert!(!is_download("https://github.com/org/repo/releases/", false, "download file"));
        // Same text elsewhere still counts
        assert!(is_download("https://github.com/org/repo/tags", false, "Download"));
    }

    #[test]
    fn test_host_rules_need_exact_host() {
        assert!(!is_download("https://example.com/o/r/releases/download/v1/asset.bin", false, ""));
        assert!(!is_download("https://github.com:8443/o/r/raw/main/x.sh", false, ""));
        // The releases veto is GitHub only
        assert!(is_download("https://example.com/o/r/releases", false, "Download"));
    }

    #[test]
    fn test_gitlab_patterns() {
        assert!(is_download("https://gitlab.com/org/repo/-/archive/main/repo-main.tar.gz", false, ""));
        assert!(is_download("https://gitlab.com/org/repo/-/archive/main/repo-main", false, ""));
        assert!(is_download(
            "https://gitlab.com/org/repo/-/releases/v1/downloads/bin/tool",
            false,
            ""
        ));
        assert!(!is_download("https://gitlab.com/org/repo/-/releases/v1", false, ""));
    }

    #[test]
    fn test_huggingface_patterns() {
        assert_eq!(
            classify("https://huggingface.co/org/model/resolve/main/weights.bin", false, "").reason,
            Reason::HostPattern(PlatformKey::Hf)
        );
        assert!(!is_download("https://huggingface.co/org/model/blob/main/weights.bin", false, ""));
    }

    #[test]
    fn test_link_text() {
        assert!(is_download("https://example.com/page", false, "Download"));
        assert!(is_download("https://example.com/page", false, "  download file  "));
        assert!(is_download("https://example.com/page", false, "Download v2.1 for Linux"));
        assert!(is_download("https://example.com/page", false, "get file"));
        assert!(!is_download("https://example.com/page", false, "Please download later"));
        assert!(!is_download("https://example.com/page", false, "downloads"));
        assert!(!is_download("https://example.com/page", false, ""));
    }

    #[test]
    fn test_text_still_applies_to_broken_urls() {
        assert!(is_download("::::", false, "Download"));
        assert!(!is_download("::::", false, "Home"));
    }

    #[test]
    fn test_classification_is_stateless() {
        let registry = Registry::builtin();
        let classifier = Classifier::new(&registry);
        let listing = ClassificationInput::new("https://github.com/o/r/releases", false, "Download");
        let other = ClassificationInput::new("https://github.com/o/r/wiki", false, "Download");
        for _ in 0..3 {
            assert!(!classifier.is_download(&listing));
            assert!(classifier.is_download(&other));
        }
    }

    #[test]
    fn test_default_is_not_download() {
        assert_eq!(
            classify("https://github.com/o/r/issues", false, "Issues"),
            Classification { is_download: false, reason: Reason::NoSignal }
        );
    }

    #[test]
    fn test_non_hierarchical_links() {
        assert_eq!(
            classify("mailto:team@example.com", false, "Contact us"),
            Classification { is_download: false, reason: Reason::NoSignal }
        );
        assert!(!is_download("tel:+15550100", false, ""));
        assert!(!is_download("javascript:void(0)", false, "menu.zip"));
        assert_eq!(
            classify("javascript:start()", false, "Download").reason,
            Reason::LinkText("download")
        );
    }
}
