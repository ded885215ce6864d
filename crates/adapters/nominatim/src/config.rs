//! Nominatim client settings.

use std::time::Duration;

use serde::Deserialize;

/// Connection settings for a Nominatim server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    /// Server root, without trailing slash.
    pub base_url: String,
    /// Sent as `User-Agent`; the public server rejects anonymous clients.
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Preferred language of returned names (`accept-language`).
    pub language: Option<String>,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("localhomed/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            language: None,
        }
    }
}

impl NominatimConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}
