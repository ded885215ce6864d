//! Settings port: the two persisted values.
//!
//! The home address is stored in its single-string form so that a corrupt
//! value can be reported to the user instead of failing the load.

use std::future::Future;

use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;

/// Raw persisted settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSettings {
    /// Serialized [`HomeAddress`], unparsed.
    pub home_address: Option<String>,
    pub threshold: Option<f64>,
}

/// Key-value persistence for the controller's settings.
pub trait SettingsStore: Send + Sync {
    /// Load whatever has been persisted so far.
    fn load(&self) -> impl Future<Output = Result<StoredSettings, HomeError>> + Send;

    /// Persist the home address under its single-string form.
    fn save_home_address(
        &self,
        address: &HomeAddress,
    ) -> impl Future<Output = Result<(), HomeError>> + Send;

    /// Persist the threshold temperature.
    fn save_threshold(&self, threshold: f64) -> impl Future<Output = Result<(), HomeError>> + Send;
}
