//! # localhome-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `SettingsStore` port defined in `localhome-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain values and `settings` rows
//!
//! ## Dependency rule
//! Depends on `localhome-app` (for port traits) and `localhome-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod settings_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use settings_store::SqliteSettingsStore;
