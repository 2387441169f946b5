//! Extension settings as owned by the background page
//!
//! The JSON shape matches what the options page persists:
//!
//! ```json
//! { "enabled": true, "xgetDomain": "xget.example.com",
//!   "enabledPlatforms": { "gh": true, "gl": false, "hf": true } }
//! ```

use std::collections::BTreeMap;

use log::error;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::PlatformKey;

/// Error type for obtaining or validating settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("settings request timed out after {0} ms")]
    Timeout(u64),
    #[error("settings request failed: {0}")]
    Transport(String),
    #[error("malformed settings: {0}")]
    Malformed(String),
    #[error("invalid proxy domain: {0:?}")]
    InvalidDomain(String),
    #[error("proxy domain {0:?} has a path prefix; only a bare host[:port] is supported")]
    PathPrefixUnsupported(String),
}

/// User settings. Missing fields default to "off".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Settings {
    pub enabled: bool,
    pub xget_domain: Option<String>,
    /// Keyed by platform key; unknown keys are kept and ignored
    pub enabled_platforms: BTreeMap<String, bool>,
}

impl Settings {
    /// The safe default used whenever settings cannot be obtained.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Settings with every builtin platform switched on.
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            enabled: true,
            xget_domain: Some(domain.into()),
            enabled_platforms: PlatformKey::ALL
                .iter()
                .map(|key| (key.as_str().to_string(), true))
                .collect(),
        }
    }

    /// Resolve a settings round-trip, substituting the disabled default on
    /// failure.
    pub fn or_disabled(result: Result<Settings, SettingsError>) -> Self {
        match result {
            Ok(settings) => settings,
            Err(e) => {
                error!("failed to get settings: {}", e);
                Self::disabled()
            }
        }
    }

    /// Configured proxy host, trimmed, `None` when blank.
    pub fn proxy_domain(&self) -> Option<&str> {
        let domain = self.xget_domain.as_deref()?.trim().trim_end_matches('/');
        (!domain.is_empty()).then_some(domain)
    }

    pub fn platform_enabled(&self, key: PlatformKey) -> bool {
        self.enabled_platforms
            .get(key.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Enabled and pointed at a proxy.
    pub fn is_active(&self) -> bool {
        self.enabled && self.proxy_domain().is_some()
    }

    pub fn set_platform(&mut self, key: PlatformKey, enabled: bool) {
        self.enabled_platforms.insert(key.as_str().to_string(), enabled);
    }
}

/// Check that a proxy domain can be spliced into `https://{domain}/...`.
///
/// A port is allowed; anything that would start a path, query, fragment or
/// userinfo is not. A mirror mounted under a sub-path (`host/prefix`) gets
/// its own error.
pub fn validate_proxy_domain(domain: &str) -> Result<&str, SettingsError> {
    let invalid = domain.is_empty()
        || domain.starts_with(':')
        || domain.starts_with('/')
        || domain
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '?' | '#' | '@' | '\\'));

    if invalid {
        Err(SettingsError::InvalidDomain(domain.to_string()))
    } else if domain.contains('/') {
        Err(SettingsError::PathPrefixUnsupported(domain.to_string()))
    } else {
        Ok(domain)
    }
}
