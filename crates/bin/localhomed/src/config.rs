//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `localhome.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use localhome_adapter_nominatim::NominatimConfig;
use localhome_adapter_virtual::VirtualHubConfig;
use localhome_app::control_loop::{ControlConfig, DEFAULT_THRESHOLD};
use localhome_domain::id::AccessoryId;
use localhome_domain::role::{AccessoryRole, RoleMap};
use localhome_domain::thermal::validate_threshold;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub control: ControlSection,
    pub roles: RolesConfig,
    pub geocoding: GeocodingConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub integrations: IntegrationsConfig,
}

/// Control loop timing and the default threshold.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlSection {
    /// Threshold used until one is persisted, in °C.
    pub threshold: f64,
    pub reconnect_interval_secs: u64,
    pub tick_interval_secs: u64,
    /// Minimum spacing between two geocoding calls.
    pub geocode_min_interval_secs: u64,
}

/// Explicit accessory roles.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Fall back to `temp` / `hum` / `relais` name matching for untagged accessories.
    pub match_by_name: bool,
    pub accessories: Vec<RoleEntry>,
}

/// One `[[roles.accessories]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleEntry {
    pub id: AccessoryId,
    pub role: AccessoryRole,
}

/// Which geocoder backs address lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodingProvider {
    /// Offline gazetteer.
    #[default]
    Virtual,
    Nominatim,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocodingProvider,
    pub nominatim: NominatimConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the simulated hub. It is the only hub integration.
    pub virtual_enabled: bool,
    /// Simulated readings.
    #[serde(rename = "virtual")]
    pub virtual_hub: VirtualHubConfig,
}

impl Config {
    /// Load configuration from `localhome.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("localhome.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LOCALHOME_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("LOCALHOME_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("LOCALHOME_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.control.threshold = threshold;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.control.threshold)
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        for (name, secs) in [
            ("reconnect_interval_secs", self.control.reconnect_interval_secs),
            ("tick_interval_secs", self.control.tick_interval_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        if !self.integrations.virtual_enabled {
            return Err(ConfigError::Validation(
                "no accessory hub enabled".to_string(),
            ));
        }
        if self.geocoding.provider == GeocodingProvider::Nominatim
            && self.geocoding.nominatim.base_url.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "geocoding.nominatim.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Control loop settings, with configured roles layered over `base`.
    #[must_use]
    pub fn control_config(&self, base: RoleMap) -> ControlConfig {
        let roles = self
            .roles
            .accessories
            .iter()
            .fold(base, |roles, entry| roles.with(entry.id, entry.role))
            .match_by_name(self.roles.match_by_name);
        ControlConfig {
            threshold: self.control.threshold,
            reconnect_interval: Duration::from_secs(self.control.reconnect_interval_secs),
            tick_interval: Duration::from_secs(self.control.tick_interval_secs),
            geocode_min_interval_secs: self.control.geocode_min_interval_secs,
            roles,
        }
    }
}

impl Default for ControlSection {
    fn default() -> Self {
        let defaults = ControlConfig::default();
        Self {
            threshold: DEFAULT_THRESHOLD,
            reconnect_interval_secs: defaults.reconnect_interval.as_secs(),
            tick_interval_secs: defaults.tick_interval.as_secs(),
            geocode_min_interval_secs: defaults.geocode_min_interval_secs,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:localhome.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "localhomed=info,localhome=info".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
            virtual_hub: VirtualHubConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
