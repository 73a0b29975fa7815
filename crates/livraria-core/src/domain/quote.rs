use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Priced offer from one courier for a quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierQuote {
    pub id: String,
    pub courier_name: String,
    pub amount: f64,
    pub currency: String,
    pub delivery_days: Option<u32>,
    pub is_locker_quote: bool,
}

impl CourierQuote {
    /// Parse one entry of a quote list. Entries without an id are skipped by
    /// returning `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value
            .get("id")
            .or_else(|| value.get("_id"))
            .and_then(scalar_to_string)?;

        let courier_name = value
            .get("courierName")
            .and_then(Value::as_str)
            .or_else(|| value.pointer("/courier/name").and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned();

        let amount = value
            .get("amount")
            .or_else(|| value.get("price"))
            .and_then(scalar_to_f64)
            .unwrap_or(0.0);

        let currency = value
            .get("currency")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let delivery_days = value
            .get("deliveryDays")
            .and_then(scalar_to_f64)
            .filter(|days| *days >= 0.0)
            .map(|days| days.round() as u32);

        let is_locker_quote = value
            .get("isLockerQuote")
            .map(is_truthy)
            .unwrap_or(false);

        Some(Self {
            id,
            courier_name,
            amount,
            currency,
            delivery_days,
            is_locker_quote,
        })
    }
}

/// Pull the quote list out of a quote-request response, which carries it
/// under `courierQuotes`, `data`, or `quotes` depending on the API version.
pub fn quotes_from_response(response: &Value) -> Vec<CourierQuote> {
    ["courierQuotes", "data", "quotes"]
        .iter()
        .find_map(|key| response.get(*key).and_then(Value::as_array))
        .map(|entries| entries.iter().filter_map(CourierQuote::from_value).collect())
        .unwrap_or_default()
}

/// Quote request id from `quoteRequest.id` or a top-level `quoteRequestId`.
pub fn quote_request_id_from_response(response: &Value) -> Option<String> {
    response
        .pointer("/quoteRequest/id")
        .or_else(|| response.get("quoteRequestId"))
        .and_then(scalar_to_string)
}

/// How the unattended flows pick a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    First,
    Cheapest,
    Fastest,
}

impl SelectionPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Cheapest => "cheapest",
            Self::Fastest => "fastest",
        }
    }

    /// Choose a quote. Ties keep the earlier quote; a missing delivery
    /// estimate ranks last under `Fastest`.
    pub fn select(self, quotes: &[CourierQuote]) -> Option<&CourierQuote> {
        match self {
            Self::First => quotes.first(),
            Self::Cheapest => quotes.iter().reduce(|best, quote| {
                if quote.amount < best.amount {
                    quote
                } else {
                    best
                }
            }),
            Self::Fastest => quotes.iter().reduce(|best, quote| {
                let best_days = best.delivery_days.unwrap_or(u32::MAX);
                let quote_days = quote.delivery_days.unwrap_or(u32::MAX);
                if quote_days < best_days {
                    quote
                } else {
                    best
                }
            }),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "cheapest" => Ok(Self::Cheapest),
            "fastest" => Ok(Self::Fastest),
            _ => Err(ValidationError::InvalidSelectionPolicy {
                value: value.to_owned(),
            }),
        }
    }
}

impl Display for SelectionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub(crate) fn scalar_to_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(text.as_str(), "1" | "true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quote(id: &str, amount: f64, days: Option<u32>) -> CourierQuote {
        CourierQuote {
            id: id.to_owned(),
            courier_name: format!("Courier {id}"),
            amount,
            currency: String::from("RON"),
            delivery_days: days,
            is_locker_quote: false,
        }
    }

    #[test]
    fn policies_pick_expected_quote() {
        let quotes = vec![
            quote("a", 25.0, None),
            quote("b", 18.5, Some(3)),
            quote("c", 18.5, Some(1)),
        ];

        assert_eq!(SelectionPolicy::First.select(&quotes).map(|q| q.id.as_str()), Some("a"));
        assert_eq!(SelectionPolicy::Cheapest.select(&quotes).map(|q| q.id.as_str()), Some("b"));
        assert_eq!(SelectionPolicy::Fastest.select(&quotes).map(|q| q.id.as_str()), Some("c"));
        assert!(SelectionPolicy::Cheapest.select(&[]).is_none());
    }

    #[test]
    fn quote_list_is_found_under_any_known_key() {
        for key in ["courierQuotes", "data", "quotes"] {
            let response = json!({ (key): [{"id": "q1", "amount": "12.40", "courierName": "Fan"}] });
            let quotes = quotes_from_response(&response);
            assert_eq!(quotes.len(), 1, "key {key}");
            assert_eq!(quotes[0].amount, 12.4);
        }
    }

    #[test]
    fn quote_request_id_accepts_nested_and_flat_shapes() {
        assert_eq!(
            quote_request_id_from_response(&json!({"quoteRequest": {"id": "qr-1"}})),
            Some(String::from("qr-1"))
        );
        assert_eq!(
            quote_request_id_from_response(&json!({"quoteRequestId": 77})),
            Some(String::from("77"))
        );
        assert_eq!(quote_request_id_from_response(&json!({"quoteRequestId": ""})), None);
    }

    #[test]
    fn policy_parsing_is_case_insensitive() {
        assert_eq!("Fastest".parse::<SelectionPolicy>().ok(), Some(SelectionPolicy::Fastest));
        assert!("slowest".parse::<SelectionPolicy>().is_err());
    }
}
