//! Settings resolution for the CLI
//!
//! A settings file uses the same JSON shape the extension stores. Flags are
//! applied on top of it, in order: file, `--domain`, `--disable`.

use std::fs;
use std::path::Path;

use tracing::debug;
use xget_core::settings::validate_proxy_domain;
use xget_core::{PlatformKey, Settings};

/// Overrides collected from the command line.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub settings_path: Option<String>,
    pub domain: Option<String>,
    pub disable: Vec<PlatformKey>,
}

pub fn load_settings_file(path: &Path) -> Result<Settings, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse settings '{}': {}", path.display(), e))
}

/// Build the effective settings.
///
/// Without a settings file, `--domain` yields enabled settings with every
/// platform on. With neither, the result is disabled.
pub fn resolve(overrides: &SettingsOverrides) -> Result<Settings, String> {
    let mut settings = match (&overrides.settings_path, &overrides.domain) {
        (Some(path), _) => load_settings_file(Path::new(path))?,
        (None, Some(domain)) => Settings::with_domain(domain.clone()),
        (None, None) => Settings::disabled(),
    };

    if let Some(domain) = &overrides.domain {
        validate_proxy_domain(domain.trim()).map_err(|e| e.to_string())?;
        settings.xget_domain = Some(domain.clone());
        settings.enabled = true;
    }

    for key in &overrides.disable {
        settings.set_platform(*key, false);
    }

    debug!(
        enabled = settings.enabled,
        domain = ?settings.proxy_domain(),
        "resolved settings"
    );
    Ok(settings)
}
