//! In-process store used by tests and one-shot tooling.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::{expiry_from_ttl, unix_now, OptionStore, OrderMetaStore, StoreError};

#[derive(Debug, Default)]
struct MemoryInner {
    options: HashMap<String, String>,
    transients: HashMap<String, (String, i64)>,
    order_meta: HashMap<(u64, String), String>,
}

/// Thread-safe in-memory implementation of both store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Poisoned("memory store"))
    }
}

impl OptionStore for MemoryStore {
    fn get_option(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.options.get(name).cloned())
    }

    fn set_option(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?
            .options
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<(), StoreError> {
        self.lock()?.options.remove(name);
        Ok(())
    }

    fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.lock()?
            .transients
            .insert(name.to_owned(), (value.to_owned(), expiry_from_ttl(ttl)));
        Ok(())
    }

    fn get_transient(&self, name: &str) -> Result<Option<String>, StoreError> {
        let now = unix_now();
        Ok(self
            .lock()?
            .transients
            .get(name)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    fn take_transient(&self, name: &str) -> Result<Option<String>, StoreError> {
        let now = unix_now();
        Ok(self
            .lock()?
            .transients
            .remove(name)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value))
    }

    fn delete_transient(&self, name: &str) -> Result<(), StoreError> {
        self.lock()?.transients.remove(name);
        Ok(())
    }
}

impl OrderMetaStore for MemoryStore {
    fn get_meta(&self, order_id: u64, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()?
            .order_meta
            .get(&(order_id, key.to_owned()))
            .cloned())
    }

    fn set_meta(&self, order_id: u64, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?
            .order_meta
            .insert((order_id, key.to_owned()), value.to_owned());
        Ok(())
    }

    fn set_meta_many(&self, order_id: u64, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for (key, value) in entries {
            inner
                .order_meta
                .insert((order_id, (*key).to_owned()), value.clone());
        }
        Ok(())
    }

    fn delete_meta(&self, order_id: u64, key: &str) -> Result<(), StoreError> {
        self.lock()?.order_meta.remove(&(order_id, key.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_transient_consumes_exactly_once() {
        let store = MemoryStore::new();
        store
            .set_transient("intent", "yes", Duration::from_secs(60))
            .expect("set");

        assert_eq!(store.take_transient("intent").expect("take"), Some(String::from("yes")));
        assert_eq!(store.take_transient("intent").expect("take again"), None);
    }

    #[test]
    fn zero_ttl_transient_is_already_expired() {
        let store = MemoryStore::new();
        store
            .set_transient("intent", "yes", Duration::ZERO)
            .expect("set");

        assert_eq!(store.get_transient("intent").expect("get"), None);
        assert_eq!(store.take_transient("intent").expect("take"), None);
    }

    #[test]
    fn order_meta_is_scoped_per_order() {
        let store = MemoryStore::new();
        store.set_meta(1, "_courier_expedition_id", "exp-1").expect("set");

        assert_eq!(
            store.get_meta(1, "_courier_expedition_id").expect("get"),
            Some(String::from("exp-1"))
        );
        assert_eq!(store.get_meta(2, "_courier_expedition_id").expect("get"), None);

        store.delete_meta(1, "_courier_expedition_id").expect("delete");
        assert_eq!(store.get_meta(1, "_courier_expedition_id").expect("get"), None);
    }
}
