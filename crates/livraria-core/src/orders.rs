//! Access to the host platform's orders.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::domain::Order;

#[derive(Debug, Error)]
pub enum OrderSourceError {
    #[error("failed to read orders from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write orders to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid order data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Orders owned by the host platform. The courier integration reads them,
/// records notes and, when simulating status hooks, changes their status.
pub trait OrderSource: Send + Sync {
    fn order(&self, order_id: u64) -> Result<Option<Order>, OrderSourceError>;

    fn add_note(&self, order_id: u64, note: &str) -> Result<(), OrderSourceError>;

    /// Set the status and return the previous one, or `None` for an unknown
    /// order.
    fn set_status(&self, order_id: u64, status: &str) -> Result<Option<String>, OrderSourceError>;
}

/// Orders held in memory, optionally loaded from and saved to a JSON file
/// containing an array of orders.
#[derive(Debug, Default)]
pub struct MemoryOrderSource {
    orders: Mutex<BTreeMap<u64, Order>>,
}

impl MemoryOrderSource {
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: Mutex::new(orders.into_iter().map(|order| (order.id, order)).collect()),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, OrderSourceError> {
        let raw = fs::read_to_string(path).map_err(|source| OrderSourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let orders: Vec<Order> = serde_json::from_str(&raw)?;
        Ok(Self::new(orders))
    }

    pub fn write_json_file(&self, path: &Path) -> Result<(), OrderSourceError> {
        let orders: Vec<Order> = self.lock().values().cloned().collect();
        let encoded = serde_json::to_string_pretty(&orders)?;
        fs::write(path, encoded).map_err(|source| OrderSourceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn insert(&self, order: Order) {
        self.lock().insert(order.id, order);
    }

    pub fn notes(&self, order_id: u64) -> Vec<String> {
        self.lock()
            .get(&order_id)
            .map(|order| order.notes.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, Order>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderSource for MemoryOrderSource {
    fn order(&self, order_id: u64) -> Result<Option<Order>, OrderSourceError> {
        Ok(self.lock().get(&order_id).cloned())
    }

    fn add_note(&self, order_id: u64, note: &str) -> Result<(), OrderSourceError> {
        if let Some(order) = self.lock().get_mut(&order_id) {
            order.notes.push(note.to_owned());
        }
        Ok(())
    }

    fn set_status(&self, order_id: u64, status: &str) -> Result<Option<String>, OrderSourceError> {
        Ok(self
            .lock()
            .get_mut(&order_id)
            .map(|order| std::mem::replace(&mut order.status, status.to_owned())))
    }
}
