use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::quote::scalar_to_string;

/// Shipment record returned by the courier API after creation or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expedition {
    pub id: String,
    pub awb_number: Option<String>,
    pub status: Option<String>,
}

impl Expedition {
    /// Parse an expedition response. Without an `id` there is no expedition.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id").and_then(scalar_to_string)?;
        Some(Self {
            id,
            awb_number: value.get("awbNumber").and_then(scalar_to_string),
            status: status_name(value),
        })
    }
}

/// `status.name` of an expedition payload.
pub fn status_name(value: &Value) -> Option<String> {
    value.pointer("/status/name").and_then(scalar_to_string)
}

/// Lifecycle of one order's courier shipment, derived from stored metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpeditionState {
    NoExpedition,
    QuotesRequested,
    QuoteSelected,
    ExpeditionCreated,
}

/// Permanent expedition data stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpeditionRecord {
    pub expedition_id: String,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub price: Option<String>,
    pub status: Option<String>,
    pub created: Option<String>,
}
