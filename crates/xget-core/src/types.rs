//! Core type definitions for Xget
//!
//! These types are shared by the registry, the classifier and the rewriter,
//! and the platform keys double as path segments on the proxy server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Platform Keys
// =============================================================================

/// Short stable identifier of a supported platform.
///
/// The string form is used verbatim as the first path segment of a rewritten
/// URL, so renaming a key breaks compatibility with the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PlatformKey {
    /// GitHub
    Gh,
    /// GitLab
    Gl,
    /// Hugging Face
    Hf,
}

impl PlatformKey {
    pub const ALL: [PlatformKey; 3] = [Self::Gh, Self::Gl, Self::Hf];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gh => "gh",
            Self::Gl => "gl",
            Self::Hf => "hf",
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known platform key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform key: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformKey {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gh" => Ok(Self::Gh),
            "gl" => Ok(Self::Gl),
            "hf" => Ok(Self::Hf),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// What the classifier gets to see of a clicked link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationInput<'a> {
    /// Resolved absolute href
    pub url: &'a str,
    /// The anchor carries a `download` attribute (with or without a value)
    pub has_download_attribute: bool,
    /// Rendered text content of the anchor
    pub text: &'a str,
}

impl<'a> ClassificationInput<'a> {
    pub fn new(url: &'a str, has_download_attribute: bool, text: &'a str) -> Self {
        Self {
            url,
            has_download_attribute,
            text,
        }
    }
}

/// Opinion of a single heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The link is a download; stop evaluating
    Download,
    /// The link is definitely not a download; stop evaluating
    NotDownload,
    /// No opinion; keep checking
    Abstain,
}

/// Which heuristic decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    DownloadAttribute,
    FileExtension(&'static str),
    HostPattern(PlatformKey),
    /// Navigation to a releases listing page
    ReleasesListing(PlatformKey),
    LinkText(&'static str),
    NoSignal,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DownloadAttribute => f.write_str("download attribute"),
            Self::FileExtension(ext) => write!(f, "file extension {}", ext),
            Self::HostPattern(key) => write!(f, "{} download path", key),
            Self::ReleasesListing(key) => write!(f, "{} releases listing", key),
            Self::LinkText(phrase) => write!(f, "link text \"{}\"", phrase),
            Self::NoSignal => f.write_str("no download signal"),
        }
    }
}

/// Final classification of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_download: bool,
    pub reason: Reason,
}
