//! # Livraria Store
//!
//! Key/value persistence used by the courier integration.
//!
//! Two scopes of state are kept:
//!
//! - **Options**: process-wide settings, the persisted session token, and
//!   short-lived transients (values with an absolute expiry).
//! - **Order metadata**: attributes keyed by `(order_id, meta_key)`, holding
//!   the transient quote-selection ids and the permanent expedition record.
//!
//! Both scopes are exposed as traits so the orchestration layer can run
//! against [`MemoryStore`] in tests and [`DuckDbStore`] in the CLI.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `options` | Process-wide settings and session token |
//! | `transients` | Expiring values (auto-create intents, courier id cache) |
//! | `order_meta` | Order-scoped attributes |

pub mod duckdb;
pub mod memory;
pub mod migrations;
pub mod store;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};
pub use memory::MemoryStore;
pub use store::DuckDbStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (creating the storage directory).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A lock guarding shared state was poisoned by a panicking writer.
    #[error("storage lock poisoned: {0}")]
    Poisoned(&'static str),
}

/// Process-wide option and transient storage.
pub trait OptionStore: Send + Sync {
    fn get_option(&self, name: &str) -> Result<Option<String>, StoreError>;

    fn set_option(&self, name: &str, value: &str) -> Result<(), StoreError>;

    fn delete_option(&self, name: &str) -> Result<(), StoreError>;

    /// Store `value` under `name` until `ttl` elapses.
    fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Read a transient without consuming it. Expired entries read as `None`.
    fn get_transient(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Read and delete a transient in one step.
    ///
    /// Two concurrent callers never both observe the same value.
    fn take_transient(&self, name: &str) -> Result<Option<String>, StoreError>;

    fn delete_transient(&self, name: &str) -> Result<(), StoreError>;
}

/// Order-scoped attribute storage.
pub trait OrderMetaStore: Send + Sync {
    fn get_meta(&self, order_id: u64, key: &str) -> Result<Option<String>, StoreError>;

    fn set_meta(&self, order_id: u64, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several attributes at once; either all are stored or none.
    fn set_meta_many(&self, order_id: u64, entries: &[(&str, String)]) -> Result<(), StoreError>;

    fn delete_meta(&self, order_id: u64, key: &str) -> Result<(), StoreError>;
}

/// Configuration for the on-disk store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for livraria data.
    pub livraria_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let livraria_home = resolve_livraria_home();
        let db_path = livraria_home.join("livraria.duckdb");
        Self {
            livraria_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl StoreConfig {
    pub fn in_dir(home: impl Into<PathBuf>) -> Self {
        let livraria_home = home.into();
        let db_path = livraria_home.join("livraria.duckdb");
        Self {
            livraria_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// Current wall-clock time as unix seconds.
pub(crate) fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Absolute expiry for a transient stored now with `ttl`.
pub(crate) fn expiry_from_ttl(ttl: Duration) -> i64 {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    unix_now().saturating_add(ttl_secs)
}

fn resolve_livraria_home() -> PathBuf {
    if let Some(path) = env::var_os("LIVRARIA_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".livraria");
    }

    PathBuf::from(".livraria")
}
