//! Courier identifier cache.
//!
//! Ids are kept in process for the TTL and mirrored into a store transient so
//! a fresh process sharing the store does not refetch them. The transient
//! carries its absolute expiry, so ids loaded from it only live for the time
//! the fetching process had left.

use std::sync::Arc;
use std::time::{Duration, Instant};

use livraria_store::OptionStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api_client::ApiClient;
use crate::domain::quote::scalar_to_string;
use crate::domain::UtcDateTime;

/// Transient holding the JSON-encoded id list and its expiry.
pub const COURIER_IDS_TRANSIENT: &str = "livraria_courier_ids";
pub const COURIER_IDS_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    ids: Vec<String>,
    expires_at: Instant,
}

/// Shape of the [`COURIER_IDS_TRANSIENT`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCourierIds {
    ids: Vec<String>,
    /// Unix seconds.
    expires_at: i64,
}

impl StoredCourierIds {
    /// Time left at `now` (unix seconds); none once expired.
    fn remaining(&self, now: i64) -> Option<Duration> {
        u64::try_from(self.expires_at.saturating_sub(now))
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Caches the ids of couriers the quote request is addressed to.
pub struct CourierIdCache {
    api: ApiClient,
    options: Arc<dyn OptionStore>,
    ttl: Duration,
    inner: tokio::sync::RwLock<Option<CacheEntry>>,
}

impl CourierIdCache {
    pub fn new(api: ApiClient, options: Arc<dyn OptionStore>) -> Self {
        Self::with_ttl(api, options, COURIER_IDS_TTL)
    }

    pub fn with_ttl(api: ApiClient, options: Arc<dyn OptionStore>, ttl: Duration) -> Self {
        Self {
            api,
            options,
            ttl,
            inner: tokio::sync::RwLock::new(None),
        }
    }

    /// Available courier ids. An empty list means the courier list could not
    /// be fetched or was empty; empty results are never cached.
    pub async fn get_available_courier_ids(&self) -> Vec<String> {
        if let Some(ids) = self.cached().await {
            return ids;
        }

        let ids = match self.api.get_available_couriers().await {
            Ok(response) => courier_ids_from_response(&response),
            Err(error) => {
                tracing::warn!(code = error.code(), "failed to fetch available couriers");
                return Vec::new();
            }
        };

        if ids.is_empty() {
            tracing::warn!("courier list is empty, not caching");
            return ids;
        }

        self.put(ids.clone()).await;
        ids
    }

    /// Drop both cache tiers.
    pub async fn clear(&self) {
        *self.inner.write().await = None;
        if let Err(error) = self.options.delete_transient(COURIER_IDS_TRANSIENT) {
            tracing::warn!(error = %error, "failed to clear courier id transient");
        }
    }

    async fn cached(&self) -> Option<Vec<String>> {
        {
            let entry = self.inner.read().await;
            if let Some(entry) = entry.as_ref().filter(|entry| Instant::now() <= entry.expires_at) {
                return Some(entry.ids.clone());
            }
        }

        let stored = match self.options.get_transient(COURIER_IDS_TRANSIENT) {
            Ok(stored) => stored?,
            Err(error) => {
                tracing::warn!(error = %error, "failed to read courier id transient");
                return None;
            }
        };
        let stored: StoredCourierIds = match serde_json::from_str(&stored) {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!(error = %error, "ignoring unreadable courier id transient");
                return None;
            }
        };
        if stored.ids.is_empty() {
            return None;
        }
        let remaining = stored
            .remaining(UtcDateTime::now().unix_timestamp())?
            .min(self.ttl);

        *self.inner.write().await = Some(CacheEntry {
            ids: stored.ids.clone(),
            expires_at: Instant::now() + remaining,
        });
        Some(stored.ids)
    }

    async fn put(&self, ids: Vec<String>) {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let stored = StoredCourierIds {
            ids: ids.clone(),
            expires_at: UtcDateTime::now().unix_timestamp().saturating_add(ttl_secs),
        };
        match serde_json::to_string(&stored) {
            Ok(encoded) => {
                if let Err(error) = self
                    .options
                    .set_transient(COURIER_IDS_TRANSIENT, &encoded, self.ttl)
                {
                    tracing::warn!(error = %error, "failed to store courier id transient");
                }
            }
            Err(error) => tracing::warn!(error = %error, "failed to encode courier ids"),
        }

        tracing::debug!(count = ids.len(), "cached courier ids");
        *self.inner.write().await = Some(CacheEntry {
            ids,
            expires_at: Instant::now() + self.ttl,
        });
    }
}

/// Ids (`_id`, else `id`) of a courier list given as an array or wrapped in
/// `data`.
pub fn courier_ids_from_response(response: &Value) -> Vec<String> {
    let entries = response
        .as_array()
        .or_else(|| response.get("data").and_then(Value::as_array));

    entries
        .map(|entries| {
            entries
                .iter()
                .filter_map(|courier| {
                    courier
                        .get("_id")
                        .and_then(scalar_to_string)
                        .or_else(|| courier.get("id").and_then(scalar_to_string))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_prefer_underscore_id() {
        let response = json!([
            {"_id": "c1", "id": "ignored", "name": "Fan"},
            {"id": 7, "name": "Cargus"},
            {"name": "no id"}
        ]);

        assert_eq!(courier_ids_from_response(&response), vec!["c1", "7"]);
    }

    #[test]
    fn ids_are_read_from_data_wrapper() {
        let response = json!({"data": [{"_id": "c1"}]});

        assert_eq!(courier_ids_from_response(&response), vec!["c1"]);
        assert!(courier_ids_from_response(&json!({"message": "x"})).is_empty());
    }

    #[test]
    fn stored_ids_only_live_until_their_expiry() {
        let stored = StoredCourierIds {
            ids: vec![String::from("fan")],
            expires_at: 1_000,
        };

        assert_eq!(stored.remaining(400), Some(Duration::from_secs(600)));
        assert_eq!(stored.remaining(1_000), None);
        assert_eq!(stored.remaining(1_200), None);
    }
}
