//! Static platform table

use std::collections::HashSet;

use crate::types::{PlatformKey, Verdict};

/// Error type for registry construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate platform key: {0}")]
    DuplicateKey(PlatformKey),
    #[error("duplicate canonical host: {0}")]
    DuplicateHost(String),
    #[error("origin is not an https origin: {0}")]
    InvalidOrigin(String),
}

// =============================================================================
// Host Path Rules
// =============================================================================

/// One host-specific heuristic, evaluated against the lowercased path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRule {
    /// Path contains the needle
    Contains(&'static str),
    /// Path contains every needle
    ContainsAll(&'static [&'static str]),
    /// Path contains the needle and ends with one of the suffixes
    ContainsWithSuffix {
        needle: &'static str,
        suffixes: &'static [&'static str],
    },
    /// Path ends with one of the suffixes: forced negative
    RejectSuffix(&'static [&'static str]),
}

impl PathRule {
    /// Evaluate this rule. `path` must already be lowercased.
    pub fn evaluate(&self, path: &str) -> Verdict {
        let fired = match *self {
            Self::Contains(needle) => path.contains(needle),
            Self::ContainsAll(needles) => needles.iter().all(|n| path.contains(n)),
            Self::ContainsWithSuffix { needle, suffixes } => {
                path.contains(needle) && suffixes.iter().any(|s| path.ends_with(s))
            }
            Self::RejectSuffix(suffixes) => suffixes.iter().any(|s| path.ends_with(s)),
        };

        match (fired, self) {
            (false, _) => Verdict::Abstain,
            (true, Self::RejectSuffix(_)) => Verdict::NotDownload,
            (true, _) => Verdict::Download,
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Everything the extension knows about one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub key: PlatformKey,
    /// Canonical origin, scheme + host
    pub origin: &'static str,
    /// Human readable name
    pub name: &'static str,
    /// Ordered download-path heuristics for links on this host
    pub link_rules: &'static [PathRule],
}

impl PlatformDescriptor {
    /// Canonical host (origin without the scheme).
    pub fn host(&self) -> &'static str {
        self.origin
            .split_once("://")
            .map_or(self.origin, |(_, host)| host)
    }

    /// Does `host_with_port` name this platform's canonical host?
    #[inline]
    pub fn is_host(&self, host_with_port: &str) -> bool {
        host_with_port.eq_ignore_ascii_case(self.host())
    }
}

const GITHUB_RULES: &[PathRule] = &[
    PathRule::Contains("/releases/download/"),
    PathRule::ContainsWithSuffix {
        needle: "/archive/",
        suffixes: &[".zip", ".tar.gz"],
    },
    PathRule::Contains("/raw/"),
    // Listing pages must never fall through to the text heuristic
    PathRule::RejectSuffix(&["/releases", "/releases/"]),
];

const GITLAB_RULES: &[PathRule] = &[
    PathRule::Contains("/-/archive/"),
    PathRule::ContainsAll(&["/-/releases/", "/downloads/"]),
];

const HUGGINGFACE_RULES: &[PathRule] = &[PathRule::Contains("/resolve/")];

const BUILTIN: [PlatformDescriptor; 3] = [
    PlatformDescriptor {
        key: PlatformKey::Gh,
        origin: "https://github.com",
        name: "GitHub",
        link_rules: GITHUB_RULES,
    },
    PlatformDescriptor {
        key: PlatformKey::Gl,
        origin: "https://gitlab.com",
        name: "GitLab",
        link_rules: GITLAB_RULES,
    },
    PlatformDescriptor {
        key: PlatformKey::Hf,
        origin: "https://huggingface.co",
        name: "Hugging Face",
        link_rules: HUGGINGFACE_RULES,
    },
];

// =============================================================================
// Registry
// =============================================================================

/// Immutable, ordered set of platform descriptors.
///
/// Built once at start-up and passed by reference to the detector,
/// classifier and rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    descriptors: Vec<PlatformDescriptor>,
}

impl Registry {
    /// Build a registry, rejecting duplicate keys or hosts.
    pub fn new(descriptors: Vec<PlatformDescriptor>) -> Result<Self, RegistryError> {
        let mut keys = HashSet::new();
        let mut hosts = HashSet::new();

        for desc in &descriptors {
            if !desc.origin.starts_with("https://") || desc.host().is_empty() {
                return Err(RegistryError::InvalidOrigin(desc.origin.to_string()));
            }
            if !keys.insert(desc.key) {
                return Err(RegistryError::DuplicateKey(desc.key));
            }
            if !hosts.insert(desc.host().to_ascii_lowercase()) {
                return Err(RegistryError::DuplicateHost(desc.host().to_string()));
            }
        }

        Ok(Self { descriptors })
    }

    /// The platforms shipped with the extension.
    pub fn builtin() -> Self {
        Self {
            descriptors: BUILTIN.to_vec(),
        }
    }

    pub fn describe(&self, key: PlatformKey) -> Option<&PlatformDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    /// All descriptors in registration order.
    pub fn all(&self) -> &[PlatformDescriptor] {
        &self.descriptors
    }

    /// Descriptor whose canonical host equals `host_with_port`.
    pub fn by_host(&self, host_with_port: &str) -> Option<&PlatformDescriptor> {
        self.descriptors.iter().find(|d| d.is_host(host_with_port))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
