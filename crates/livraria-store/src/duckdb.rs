//! `DuckDB` connection pool management.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::Connection;

use crate::StoreError;

struct PoolInner {
    db_path: PathBuf,
    max_pool_size: usize,
    /// Database handle every pooled connection is cloned from, so all of
    /// them share one database instance and one file lock.
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
}

/// A connection pool manager for `DuckDB` connections.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    /// Open the database file and create a pool around it.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn open(path: impl Into<PathBuf>, max_pool_size: usize) -> Result<Self, StoreError> {
        let db_path = path.into();
        let root = Connection::open(db_path.as_path())?;
        configure_connection(&root)?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_pool_size: max_pool_size.max(1),
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Acquire a connection from the pool, cloning a new one from the root
    /// handle when no idle connection is available.
    ///
    /// # Errors
    /// Returns an error if a new connection cannot be created or a pool lock
    /// was poisoned.
    pub fn acquire(&self) -> Result<PooledConnection, StoreError> {
        let idle = self
            .inner
            .idle
            .lock()
            .map_err(|_| StoreError::Poisoned("duckdb idle pool"))?
            .pop();

        let connection = match idle {
            Some(connection) => connection,
            None => {
                let root = self
                    .inner
                    .root
                    .lock()
                    .map_err(|_| StoreError::Poisoned("duckdb root connection"))?;
                let connection = root.try_clone()?;
                configure_connection(&connection)?;
                connection
            }
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }
}

/// A pooled connection that returns to the pool when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection unexpectedly missing")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection unexpectedly missing")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        // A poisoned pool just drops the connection instead of recycling it.
        if let Ok(mut idle) = self.pool.idle.lock() {
            if idle.len() < self.pool.max_pool_size {
                idle.push(connection);
            }
        }
    }
}

fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}
