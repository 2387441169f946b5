//! URL to platform lookup

use log::debug;

use super::Registry;
use crate::types::PlatformKey;
use crate::url::parse_absolute;

impl Registry {
    /// Return the key of the platform whose canonical origin `url` is on.
    ///
    /// Only `https` URLs on the exact canonical host match. Malformed input
    /// is never an error, just no match.
    pub fn detect(&self, url: &str) -> Option<PlatformKey> {
        let parts = match parse_absolute(url) {
            Ok(parts) => parts,
            Err(e) => {
                debug!("detect: unparseable url {:?}: {}", url, e);
                return None;
            }
        };

        if !parts.scheme.eq_ignore_ascii_case("https") {
            return None;
        }

        self.all()
            .iter()
            .find(|desc| desc.is_host(parts.host_with_port))
            .map(|desc| desc.key)
    }
}
