//! `SQLite` implementation of [`SettingsStore`].
//!
//! Each setting is one row of the `settings` table holding a JSON value.

use std::future::Future;

use sqlx::SqlitePool;

use localhome_app::ports::{SettingsStore, StoredSettings};
use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;

use crate::error::StorageError;

const HOME_ADDRESS_KEY: &str = "home_address";
const THRESHOLD_KEY: &str = "threshold_temperature";

const UPSERT: &str = "INSERT INTO settings (key, value) VALUES (?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
const SELECT_ALL: &str = "SELECT key, value FROM settings";

/// `SQLite`-backed settings store.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn upsert(
    pool: &SqlitePool,
    key: &'static str,
    value: serde_json::Value,
) -> Result<(), StorageError> {
    sqlx::query(UPSERT)
        .bind(key)
        .bind(value.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned>(key: &'static str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|source| StorageError::Json { key, source })
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> impl Future<Output = Result<StoredSettings, HomeError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<(String, String)> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let mut stored = StoredSettings::default();
            for (key, raw) in rows {
                match key.as_str() {
                    HOME_ADDRESS_KEY => stored.home_address = Some(decode(HOME_ADDRESS_KEY, &raw)?),
                    THRESHOLD_KEY => stored.threshold = Some(decode(THRESHOLD_KEY, &raw)?),
                    other => tracing::debug!(key = other, "ignoring unknown setting"),
                }
            }
            Ok(stored)
        }
    }

    fn save_home_address(
        &self,
        address: &HomeAddress,
    ) -> impl Future<Output = Result<(), HomeError>> + Send {
        let pool = self.pool.clone();
        let value = serde_json::Value::String(address.serialize());
        async move {
            upsert(&pool, HOME_ADDRESS_KEY, value).await?;
            Ok(())
        }
    }

    fn save_threshold(&self, threshold: f64) -> impl Future<Output = Result<(), HomeError>> + Send {
        let pool = self.pool.clone();
        async move {
            upsert(&pool, THRESHOLD_KEY, serde_json::Value::from(threshold)).await?;
            Ok(())
        }
    }
}
