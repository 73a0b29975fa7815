//! DuckDB-backed store.

use std::fs;
use std::path::Path;
use std::time::Duration;

use ::duckdb::{Connection, ToSql};

use crate::duckdb::DuckDbConnectionManager;
use crate::{expiry_from_ttl, migrations, unix_now, OptionStore, OrderMetaStore, StoreConfig, StoreError};

/// Durable store persisting options, transients, and order metadata in a
/// single `DuckDB` file.
#[derive(Clone)]
pub struct DuckDbStore {
    manager: DuckDbConnectionManager,
}

impl DuckDbStore {
    /// Open the store under `$LIVRARIA_HOME`.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    /// Open the store with the given configuration, creating the parent
    /// directory and applying pending migrations.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let store = Self { manager };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Delete expired transients, returning how many rows were removed.
    pub fn purge_expired_transients(&self) -> Result<usize, StoreError> {
        let connection = self.manager.acquire()?;
        let removed = connection.execute(
            "DELETE FROM transients WHERE expires_at <= ?",
            [unix_now()],
        )?;
        Ok(removed)
    }
}

impl OptionStore for DuckDbStore {
    fn get_option(&self, name: &str) -> Result<Option<String>, StoreError> {
        let connection = self.manager.acquire()?;
        query_optional_string(
            &connection,
            "SELECT value FROM options WHERE name = ?",
            &[&name],
        )
    }

    fn set_option(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        let params: [&dyn ToSql; 2] = [&name, &value];
        connection.execute(
            "INSERT OR REPLACE INTO options (name, value, updated_at) \
             VALUES (?, ?, CURRENT_TIMESTAMP)",
            params.as_slice(),
        )?;
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        connection.execute("DELETE FROM options WHERE name = ?", [name])?;
        Ok(())
    }

    fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        let expires_at = expiry_from_ttl(ttl);
        let params: [&dyn ToSql; 3] = [&name, &value, &expires_at];
        connection.execute(
            "INSERT OR REPLACE INTO transients (name, value, expires_at) VALUES (?, ?, ?)",
            params.as_slice(),
        )?;
        Ok(())
    }

    fn get_transient(&self, name: &str) -> Result<Option<String>, StoreError> {
        let connection = self.manager.acquire()?;
        let now = unix_now();
        query_optional_string(
            &connection,
            "SELECT value FROM transients WHERE name = ? AND expires_at > ?",
            &[&name, &now],
        )
    }

    fn take_transient(&self, name: &str) -> Result<Option<String>, StoreError> {
        let connection = self.manager.acquire()?;
        let now = unix_now();
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<Option<String>, StoreError> {
            let value = query_optional_string(
                &connection,
                "SELECT value FROM transients WHERE name = ? AND expires_at > ?",
                &[&name, &now],
            )?;
            connection.execute("DELETE FROM transients WHERE name = ?", [name])?;
            Ok(value)
        })();

        finalize_transaction(&connection, result)
    }

    fn delete_transient(&self, name: &str) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        connection.execute("DELETE FROM transients WHERE name = ?", [name])?;
        Ok(())
    }
}

impl OrderMetaStore for DuckDbStore {
    fn get_meta(&self, order_id: u64, key: &str) -> Result<Option<String>, StoreError> {
        let connection = self.manager.acquire()?;
        query_optional_string(
            &connection,
            "SELECT meta_value FROM order_meta WHERE order_id = ? AND meta_key = ?",
            &[&order_id, &key],
        )
    }

    fn set_meta(&self, order_id: u64, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_meta_many(order_id, &[(key, value.to_owned())])
    }

    fn set_meta_many(&self, order_id: u64, entries: &[(&str, String)]) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), StoreError> {
            for (key, value) in entries {
                let params: [&dyn ToSql; 3] = [&order_id, key, value];
                connection.execute(
                    "INSERT OR REPLACE INTO order_meta (order_id, meta_key, meta_value, updated_at) \
                     VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
                    params.as_slice(),
                )?;
            }
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    fn delete_meta(&self, order_id: u64, key: &str) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        let params: [&dyn ToSql; 2] = [&order_id, &key];
        connection.execute(
            "DELETE FROM order_meta WHERE order_id = ? AND meta_key = ?",
            params.as_slice(),
        )?;
        Ok(())
    }
}

fn query_optional_string(
    connection: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Option<String>, StoreError> {
    let mut statement = connection.prepare(sql)?;
    let mut rows = statement.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(temp: &tempfile::TempDir) -> DuckDbStore {
        DuckDbStore::open(StoreConfig {
            livraria_home: temp.path().to_path_buf(),
            db_path: temp.path().join("nested").join("livraria.duckdb"),
            max_pool_size: 2,
        })
        .expect("store open")
    }

    #[test]
    fn options_round_trip_and_overwrite() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);

        store.set_option("courier_auto_create", "1").expect("set");
        store.set_option("courier_auto_create", "0").expect("overwrite");

        assert_eq!(
            store.get_option("courier_auto_create").expect("get"),
            Some(String::from("0"))
        );

        store.delete_option("courier_auto_create").expect("delete");
        assert_eq!(store.get_option("courier_auto_create").expect("get"), None);
    }

    #[test]
    fn meta_values_with_quotes_are_stored_verbatim() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);

        let hostile = "x'); DROP TABLE order_meta; --";
        store.set_meta(42, "_courier_name", hostile).expect("set");

        assert_eq!(
            store.get_meta(42, "_courier_name").expect("get"),
            Some(hostile.to_owned())
        );
    }

    #[test]
    fn take_transient_deletes_the_row() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);

        store
            .set_transient("livraria_auto_create_order_7", "1", Duration::from_secs(60))
            .expect("set");

        assert_eq!(
            store.take_transient("livraria_auto_create_order_7").expect("take"),
            Some(String::from("1"))
        );
        assert_eq!(
            store.take_transient("livraria_auto_create_order_7").expect("take again"),
            None
        );
    }

    #[test]
    fn state_survives_reopening_the_file() {
        let temp = tempdir().expect("tempdir");
        {
            let store = open_store(&temp);
            store
                .set_meta_many(
                    9,
                    &[
                        ("_courier_expedition_id", String::from("exp-9")),
                        ("_courier_awb_number", String::from("AWB9")),
                    ],
                )
                .expect("set many");
        }

        let reopened = open_store(&temp);
        assert_eq!(
            reopened.get_meta(9, "_courier_awb_number").expect("get"),
            Some(String::from("AWB9"))
        );
    }

    #[test]
    fn purge_removes_only_expired_transients() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);

        store.set_transient("stale", "1", Duration::ZERO).expect("set");
        store
            .set_transient("fresh", "1", Duration::from_secs(3600))
            .expect("set");

        assert_eq!(store.purge_expired_transients().expect("purge"), 1);
        assert!(store.get_transient("fresh").expect("get").is_some());
    }
}
