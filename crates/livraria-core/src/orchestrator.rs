//! Quote and expedition orchestration for one order at a time.
//!
//! An order moves through [`ExpeditionState`]: quotes are requested, one is
//! selected, billing is attached and the expedition is created. The state is
//! never held in memory; it is derived from order metadata so interactive
//! and unattended triggers observe the same progress.
//!
//! Every operation that can create an expedition holds a per-order async
//! mutex from the existence check until the expedition is recorded, so two
//! triggers for the same order cannot both create one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use livraria_store::{OptionStore, OrderMetaStore};
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::api_client::ApiClient;
use crate::auto_create::intent_key;
use crate::cache::CourierIdCache;
use crate::config::Settings;
use crate::domain::expedition::status_name;
use crate::domain::quote::scalar_to_string;
use crate::domain::{
    pickup_date, quote_request_id_from_response, quotes_from_response, CourierQuote,
    CustomExpeditionData, Expedition, ExpeditionRecord, ExpeditionState, Order, UtcDateTime,
};
use crate::error::HandlerError;
use crate::orders::OrderSource;
use crate::payload::{
    build_quote_request, missing_order_fields, CreateExpeditionPayload, InlineExpeditionPayload,
    QuoteInputs,
};
use crate::sender::{profiles_from_response, select_profile, SenderProfile};

/// Order metadata keys.
pub mod meta_keys {
    pub const EXPEDITION_ID: &str = "_courier_expedition_id";
    pub const QUOTE_ID: &str = "_courier_quote_id";
    pub const COURIER_NAME: &str = "_courier_name";
    pub const PRICE: &str = "_courier_price";
    pub const AWB_NUMBER: &str = "_courier_awb_number";
    pub const STATUS: &str = "_courier_status";
    pub const CREATED: &str = "_courier_expedition_created";
    pub const QUOTE_REQUEST_ID: &str = "_courier_quote_request_id";
    pub const SELECTED_QUOTE_ID: &str = "_courier_selected_quote_id";
    pub const QUOTE_SNAPSHOT: &str = "_courier_quote_snapshot";
    pub const SENDER_PROFILE_ID: &str = "_livraria_sender_profile_id";

    /// Keys that only live between requesting quotes and creating the
    /// expedition.
    pub const TRANSIENT: &[&str] = &[
        QUOTE_REQUEST_ID,
        SELECTED_QUOTE_ID,
        QUOTE_SNAPSHOT,
        SENDER_PROFILE_ID,
    ];
}

/// Quotes presented for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesResult {
    pub quote_request_id: String,
    pub quotes: Vec<CourierQuote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    pub quote_request_id: String,
    pub selected_quote_id: String,
    pub billing_attached: bool,
}

/// Expedition recorded on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpeditionResult {
    pub expedition_id: String,
    pub awb_number: Option<String>,
    pub status: Option<String>,
}

impl From<&Expedition> for ExpeditionResult {
    fn from(expedition: &Expedition) -> Self {
        Self {
            expedition_id: expedition.id.clone(),
            awb_number: expedition.awb_number.clone(),
            status: expedition.status.clone(),
        }
    }
}

/// What an unattended creation attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutoCreateOutcome {
    Disabled,
    AlreadyExists,
    Created(ExpeditionResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResult {
    pub status: String,
    pub data: Value,
}

/// Drives orders from quote request to created expedition.
pub struct OrderHandler {
    api: ApiClient,
    couriers: Arc<CourierIdCache>,
    orders: Arc<dyn OrderSource>,
    meta: Arc<dyn OrderMetaStore>,
    options: Arc<dyn OptionStore>,
    locks: Mutex<HashMap<u64, Arc<tokio::sync::Mutex<()>>>>,
}

impl OrderHandler {
    pub fn new(
        api: ApiClient,
        couriers: Arc<CourierIdCache>,
        orders: Arc<dyn OrderSource>,
        meta: Arc<dyn OrderMetaStore>,
        options: Arc<dyn OptionStore>,
    ) -> Self {
        Self {
            api,
            couriers,
            orders,
            meta,
            options,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn options(&self) -> &Arc<dyn OptionStore> {
        &self.options
    }

    /// Progress of the order, derived from its metadata.
    pub fn state(&self, order_id: u64) -> Result<ExpeditionState, HandlerError> {
        if self.meta_value(order_id, meta_keys::EXPEDITION_ID)?.is_some() {
            return Ok(ExpeditionState::ExpeditionCreated);
        }
        let request = self.meta_value(order_id, meta_keys::QUOTE_REQUEST_ID)?;
        let selected = self.meta_value(order_id, meta_keys::SELECTED_QUOTE_ID)?;
        Ok(match (request, selected) {
            (Some(_), Some(_)) => ExpeditionState::QuoteSelected,
            (Some(_), None) => ExpeditionState::QuotesRequested,
            _ => ExpeditionState::NoExpedition,
        })
    }

    /// Create a quote request and return the non-locker quotes. The request id
    /// replaces any earlier one for this order and clears its selection.
    pub async fn get_quotes_for_order(
        &self,
        order_id: u64,
        custom: Option<&CustomExpeditionData>,
    ) -> Result<QuotesResult, HandlerError> {
        self.get_quotes_locked(order_id, custom)
            .instrument(operation_span("get_quotes", order_id))
            .await
    }

    /// Select a quote of this order's latest quote request.
    pub async fn select_quote(
        &self,
        order_id: u64,
        quote_request_id: &str,
        quote_id: &str,
        sender_profile_id: Option<&str>,
    ) -> Result<SelectionResult, HandlerError> {
        self.select_quote_locked(order_id, quote_request_id, quote_id, sender_profile_id)
            .instrument(operation_span("select_quote", order_id))
            .await
    }

    /// Create the expedition for the selected quote, billed to the default
    /// sender profile.
    pub async fn generate_label(&self, order_id: u64) -> Result<ExpeditionResult, HandlerError> {
        self.generate_label_locked(order_id)
            .instrument(operation_span("generate_label", order_id))
            .await
    }

    /// One-shot creation: request quotes, pick one by the configured policy,
    /// select it and create the expedition with inline billing details.
    pub async fn create_expedition_for_order(
        &self,
        order_id: u64,
        custom: Option<&CustomExpeditionData>,
    ) -> Result<ExpeditionResult, HandlerError> {
        self.create_expedition_locked(order_id, custom)
            .instrument(operation_span("create_expedition", order_id))
            .await
    }

    /// Unattended creation with the first quote and the default sender
    /// profile. Stops at the first failing step.
    pub async fn auto_create_expedition(&self, order_id: u64) -> Result<AutoCreateOutcome, HandlerError> {
        self.auto_create_locked(order_id)
            .instrument(operation_span("auto_create", order_id))
            .await
    }

    /// Consume the order's pending auto-create intent and run it. Returns
    /// `None` when there was no intent, so each intent runs at most once.
    pub async fn run_pending_auto_create(
        &self,
        order_id: u64,
    ) -> Result<Option<AutoCreateOutcome>, HandlerError> {
        if self.options.take_transient(&intent_key(order_id))?.is_none() {
            tracing::debug!(order_id, "no pending auto-create intent");
            return Ok(None);
        }
        tracing::info!(order_id, "running pending auto-create");
        self.auto_create_expedition(order_id).await.map(Some)
    }

    /// Refresh the stored status from the tracking lookup.
    pub async fn update_expedition_status(
        &self,
        order_id: u64,
        awb_number: Option<&str>,
    ) -> Result<StatusResult, HandlerError> {
        let awb = match awb_number.map(str::trim).filter(|awb| !awb.is_empty()) {
            Some(awb) => awb.to_owned(),
            None => self
                .meta_value(order_id, meta_keys::AWB_NUMBER)?
                .ok_or(HandlerError::NoAwb)?,
        };

        let response = self
            .api
            .get_expedition_by_tracking(&awb)
            .await
            .map_err(|error| {
                tracing::warn!(order_id, code = error.code(), "tracking lookup failed");
                HandlerError::StatusFetchFailed
            })?;

        let status = status_name(&response).unwrap_or_else(|| String::from("Unknown"));
        self.meta.set_meta(order_id, meta_keys::STATUS, &status)?;
        tracing::info!(order_id, status = %status, "expedition status updated");

        Ok(StatusResult {
            status,
            data: response,
        })
    }

    /// The expedition stored on the order, if any.
    pub fn get_order_expedition_data(&self, order_id: u64) -> Result<Option<ExpeditionRecord>, HandlerError> {
        let Some(expedition_id) = self.meta_value(order_id, meta_keys::EXPEDITION_ID)? else {
            return Ok(None);
        };

        Ok(Some(ExpeditionRecord {
            expedition_id,
            awb_number: self.meta_value(order_id, meta_keys::AWB_NUMBER)?,
            courier_name: self.meta_value(order_id, meta_keys::COURIER_NAME)?,
            price: self.meta_value(order_id, meta_keys::PRICE)?,
            status: self.meta_value(order_id, meta_keys::STATUS)?,
            created: self.meta_value(order_id, meta_keys::CREATED)?,
        }))
    }

    async fn get_quotes_locked(
        &self,
        order_id: u64,
        custom: Option<&CustomExpeditionData>,
    ) -> Result<QuotesResult, HandlerError> {
        let order = self.load_order(order_id)?;
        let lock = self.order_lock(order_id);
        let _guard = lock.lock().await;

        self.ensure_no_expedition(order_id)?;
        let settings = Settings::load(self.options.as_ref())?;
        let (quote_request_id, quotes) = self.request_quotes(&order, custom, &settings).await?;
        self.persist_quote_request(order_id, &quote_request_id, &quotes)?;

        tracing::info!(
            order_id,
            quote_request_id = %quote_request_id,
            count = quotes.len(),
            "quotes requested"
        );
        Ok(QuotesResult {
            quote_request_id,
            quotes,
        })
    }

    async fn select_quote_locked(
        &self,
        order_id: u64,
        quote_request_id: &str,
        quote_id: &str,
        sender_profile_id: Option<&str>,
    ) -> Result<SelectionResult, HandlerError> {
        self.load_order(order_id)?;
        let lock = self.order_lock(order_id);
        let _guard = lock.lock().await;

        self.ensure_no_expedition(order_id)?;
        let stored = self
            .meta_value(order_id, meta_keys::QUOTE_REQUEST_ID)?
            .ok_or(HandlerError::NoQuoteRequest)?;
        if stored != quote_request_id.trim() {
            tracing::warn!(order_id, "quote request id does not match this order's latest request");
            return Err(HandlerError::QuoteRequestMismatch);
        }
        if let Some(snapshot) = self.quote_snapshot(order_id)? {
            if !snapshot.iter().any(|quote| quote.id == quote_id) {
                return Err(HandlerError::UnknownQuote);
            }
        }

        self.api
            .select_courier_quote(&stored, quote_id)
            .await
            .map_err(HandlerError::SelectFailed)?;
        self.meta
            .set_meta(order_id, meta_keys::SELECTED_QUOTE_ID, quote_id)?;

        let mut billing_attached = false;
        if let Some(profile_id) = sender_profile_id.map(str::trim).filter(|id| !id.is_empty()) {
            self.meta
                .set_meta(order_id, meta_keys::SENDER_PROFILE_ID, profile_id)?;
            match self
                .api
                .attach_billing_info_from_sender_profile(&stored, profile_id)
                .await
            {
                Ok(_) => billing_attached = true,
                Err(error) => tracing::warn!(
                    order_id,
                    code = error.code(),
                    "failed to attach billing info from sender profile, selection kept"
                ),
            }
        }

        tracing::info!(order_id, quote_id, "quote selected");
        Ok(SelectionResult {
            quote_request_id: stored,
            selected_quote_id: quote_id.to_owned(),
            billing_attached,
        })
    }

    async fn generate_label_locked(&self, order_id: u64) -> Result<ExpeditionResult, HandlerError> {
        let order = self.load_order(order_id)?;
        let lock = self.order_lock(order_id);
        let _guard = lock.lock().await;

        self.ensure_no_expedition(order_id)?;
        let quote_request_id = self.meta_value(order_id, meta_keys::QUOTE_REQUEST_ID)?;
        let quote_id = self.meta_value(order_id, meta_keys::SELECTED_QUOTE_ID)?;
        let (Some(quote_request_id), Some(quote_id)) = (quote_request_id, quote_id) else {
            return Err(HandlerError::MissingQuoteSelection);
        };

        let settings = Settings::load(self.options.as_ref())?;
        let profile_id = settings
            .default_sender_profile_id
            .ok_or(HandlerError::NoDefaultSenderProfile)?;

        let expedition = self
            .bill_and_create(&quote_request_id, &quote_id, &profile_id)
            .await?;
        let quote = self.quote_snapshot(order_id)?.and_then(|quotes| {
            quotes.into_iter().find(|quote| quote.id == quote_id)
        });
        self.record_expedition(&order, &expedition, &quote_id, quote.as_ref())?;

        Ok(ExpeditionResult::from(&expedition))
    }

    async fn create_expedition_locked(
        &self,
        order_id: u64,
        custom: Option<&CustomExpeditionData>,
    ) -> Result<ExpeditionResult, HandlerError> {
        let order = self.load_order(order_id)?;
        let lock = self.order_lock(order_id);
        let _guard = lock.lock().await;

        self.ensure_no_expedition(order_id)?;
        let settings = Settings::load(self.options.as_ref())?;
        let (quote_request_id, quotes) = self.request_quotes(&order, custom, &settings).await?;
        let quote = settings
            .quote_selection
            .select(&quotes)
            .cloned()
            .ok_or(HandlerError::NoQuotes)?;
        tracing::info!(
            order_id,
            quote_id = %quote.id,
            policy = %settings.quote_selection,
            "quote chosen"
        );

        self.api
            .select_courier_quote(&quote_request_id, &quote.id)
            .await
            .map_err(HandlerError::SelectFailed)?;

        let pickup = pickup_date(
            UtcDateTime::now(),
            settings.pickup_days_offset,
            settings.skip_weekends,
        );
        let payload = InlineExpeditionPayload::new(&order, &quote_request_id, &quote.id, pickup);
        let response = self
            .api
            .create_inline_expedition(&payload)
            .await
            .map_err(|error| {
                tracing::error!(order_id, code = error.code(), "expedition creation failed");
                HandlerError::ExpeditionCreateFailed
            })?;
        let expedition = Expedition::from_value(&response).ok_or(HandlerError::ExpeditionCreateFailed)?;

        self.record_expedition(&order, &expedition, &quote.id, Some(&quote))?;
        Ok(ExpeditionResult::from(&expedition))
    }

    async fn auto_create_locked(&self, order_id: u64) -> Result<AutoCreateOutcome, HandlerError> {
        let settings = Settings::load(self.options.as_ref())?;
        if !settings.auto_create {
            tracing::info!(order_id, "auto-create is disabled");
            return Ok(AutoCreateOutcome::Disabled);
        }

        let order = self.load_order(order_id)?;
        let lock = self.order_lock(order_id);
        let _guard = lock.lock().await;

        if self.meta_value(order_id, meta_keys::EXPEDITION_ID)?.is_some() {
            tracing::info!(order_id, "expedition already exists, skipping auto-create");
            return Ok(AutoCreateOutcome::AlreadyExists);
        }

        let (quote_request_id, quotes) = self.request_quotes(&order, None, &settings).await?;
        self.persist_quote_request(order_id, &quote_request_id, &quotes)?;
        let quote = quotes.first().cloned().ok_or(HandlerError::NoQuotes)?;
        self.meta
            .set_meta(order_id, meta_keys::SELECTED_QUOTE_ID, &quote.id)?;

        self.api
            .select_courier_quote(&quote_request_id, &quote.id)
            .await
            .map_err(HandlerError::SelectFailed)?;

        let profile_id = settings
            .default_sender_profile_id
            .clone()
            .ok_or(HandlerError::NoDefaultSenderProfile)?;
        let expedition = self
            .bill_and_create(&quote_request_id, &quote.id, &profile_id)
            .await?;

        self.record_expedition(&order, &expedition, &quote.id, Some(&quote))?;
        Ok(AutoCreateOutcome::Created(ExpeditionResult::from(&expedition)))
    }

    /// Validate the order, resolve couriers and the sender, and create a quote
    /// request. Locker quotes are dropped.
    async fn request_quotes(
        &self,
        order: &Order,
        custom: Option<&CustomExpeditionData>,
        settings: &Settings,
    ) -> Result<(String, Vec<CourierQuote>), HandlerError> {
        let labels = missing_order_fields(order);
        if !labels.is_empty() {
            return Err(HandlerError::MissingOrderFields { labels });
        }
        if let Some(custom) = custom {
            custom.validate()?;
        }

        let courier_ids = self.couriers.get_available_courier_ids().await;
        if courier_ids.is_empty() {
            return Err(HandlerError::NoCouriers);
        }

        let profile = self.sender_profile(settings).await;
        let payload = build_quote_request(QuoteInputs {
            order,
            custom,
            settings,
            profile: profile.as_ref(),
            courier_ids: &courier_ids,
            now: UtcDateTime::now(),
        })?;

        let response = self
            .api
            .create_quote_request(&payload)
            .await
            .map_err(HandlerError::QuoteRequestFailed)?;
        let quote_request_id =
            quote_request_id_from_response(&response).ok_or(HandlerError::MissingQuoteRequestId)?;

        let quotes: Vec<CourierQuote> = quotes_from_response(&response)
            .into_iter()
            .filter(|quote| !quote.is_locker_quote)
            .collect();
        if quotes.is_empty() {
            return Err(HandlerError::NoQuotes);
        }

        Ok((quote_request_id, quotes))
    }

    /// Attach billing from `profile_id` and create the expedition.
    async fn bill_and_create(
        &self,
        quote_request_id: &str,
        quote_id: &str,
        profile_id: &str,
    ) -> Result<Expedition, HandlerError> {
        let billing = self
            .api
            .attach_billing_info_from_sender_profile(quote_request_id, profile_id)
            .await
            .map_err(|error| {
                tracing::error!(code = error.code(), "billing attach failed");
                HandlerError::BillingAttachFailed
            })?;
        let billing_info_id = billing
            .get("id")
            .and_then(scalar_to_string)
            .ok_or(HandlerError::BillingAttachFailed)?;

        let payload = CreateExpeditionPayload {
            quote_request_id: quote_request_id.to_owned(),
            courier_quote_id: quote_id.to_owned(),
            billing_info_id,
        };
        let response = self.api.create_expedition(&payload).await.map_err(|error| {
            tracing::error!(code = error.code(), "expedition creation failed");
            HandlerError::ExpeditionCreateFailed
        })?;

        Expedition::from_value(&response).ok_or(HandlerError::ExpeditionCreateFailed)
    }

    /// Write the permanent expedition metadata, drop the transient keys and
    /// leave a note on the order.
    fn record_expedition(
        &self,
        order: &Order,
        expedition: &Expedition,
        quote_id: &str,
        quote: Option<&CourierQuote>,
    ) -> Result<(), HandlerError> {
        let mut entries: Vec<(&str, String)> = vec![
            (meta_keys::EXPEDITION_ID, expedition.id.clone()),
            (meta_keys::QUOTE_ID, quote_id.to_owned()),
            (
                meta_keys::COURIER_NAME,
                quote.map(|quote| quote.courier_name.clone()).unwrap_or_default(),
            ),
            (
                meta_keys::PRICE,
                format_price(quote.map_or(0.0, |quote| quote.amount)),
            ),
            (meta_keys::CREATED, UtcDateTime::now().format_record()),
        ];
        if let Some(awb) = &expedition.awb_number {
            entries.push((meta_keys::AWB_NUMBER, awb.clone()));
        }
        if let Some(status) = &expedition.status {
            entries.push((meta_keys::STATUS, status.clone()));
        }
        self.meta.set_meta_many(order.id, &entries)?;

        for key in meta_keys::TRANSIENT {
            self.meta.delete_meta(order.id, key)?;
        }

        let note = expedition_note(expedition);
        if let Err(error) = self.orders.add_note(order.id, &note) {
            tracing::warn!(order_id = order.id, error = %error, "failed to add order note");
        }

        tracing::info!(
            order_id = order.id,
            expedition_id = %expedition.id,
            awb = expedition.awb_number.as_deref().unwrap_or(""),
            "expedition created"
        );
        Ok(())
    }

    fn persist_quote_request(
        &self,
        order_id: u64,
        quote_request_id: &str,
        quotes: &[CourierQuote],
    ) -> Result<(), HandlerError> {
        let snapshot = serde_json::to_string(quotes)?;
        self.meta.set_meta_many(
            order_id,
            &[
                (meta_keys::QUOTE_REQUEST_ID, quote_request_id.to_owned()),
                (meta_keys::QUOTE_SNAPSHOT, snapshot),
            ],
        )?;
        self.meta.delete_meta(order_id, meta_keys::SELECTED_QUOTE_ID)?;
        Ok(())
    }

    fn quote_snapshot(&self, order_id: u64) -> Result<Option<Vec<CourierQuote>>, HandlerError> {
        let Some(raw) = self.meta_value(order_id, meta_keys::QUOTE_SNAPSHOT)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(quotes) => Ok(Some(quotes)),
            Err(error) => {
                tracing::warn!(order_id, error = %error, "ignoring unreadable quote snapshot");
                Ok(None)
            }
        }
    }

    /// Sender profile for quote requests: the default profile when configured,
    /// else the first one. Failures fall back to local sender settings.
    async fn sender_profile(&self, settings: &Settings) -> Option<SenderProfile> {
        match self.api.get_sender_profile().await {
            Ok(response) => select_profile(
                profiles_from_response(&response),
                settings.default_sender_profile_id.as_deref(),
            ),
            Err(error) => {
                tracing::warn!(code = error.code(), "sender profile unavailable, using local sender settings");
                None
            }
        }
    }

    fn ensure_no_expedition(&self, order_id: u64) -> Result<(), HandlerError> {
        if self.meta_value(order_id, meta_keys::EXPEDITION_ID)?.is_some() {
            return Err(HandlerError::ExpeditionExists);
        }
        Ok(())
    }

    fn load_order(&self, order_id: u64) -> Result<Order, HandlerError> {
        self.orders
            .order(order_id)?
            .ok_or(HandlerError::OrderNotFound(order_id))
    }

    fn meta_value(&self, order_id: u64, key: &str) -> Result<Option<String>, HandlerError> {
        Ok(self
            .meta
            .get_meta(order_id, key)?
            .filter(|value| !value.trim().is_empty()))
    }

    fn order_lock(&self, order_id: u64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(order_id).or_default())
    }
}

/// `Courier expedition created successfully. ID: <id>[, AWB: <awb>][, Status: <status>]`
pub fn expedition_note(expedition: &Expedition) -> String {
    let mut note = format!("Courier expedition created successfully. ID: {}", expedition.id);
    if let Some(awb) = &expedition.awb_number {
        note.push_str(&format!(", AWB: {awb}"));
    }
    if let Some(status) = &expedition.status {
        note.push_str(&format!(", Status: {status}"));
    }
    note
}

/// Prices are stored with two decimals: `150.00`.
fn format_price(amount: f64) -> String {
    format!("{amount:.2}")
}

fn operation_span(operation: &'static str, order_id: u64) -> tracing::Span {
    tracing::info_span!("order_operation", operation, order_id, request_id = %Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_keep_two_decimals() {
        assert_eq!(format_price(150.0), "150.00");
        assert_eq!(format_price(21.5), "21.50");
        assert_eq!(format_price(0.0), "0.00");
    }

    #[test]
    fn note_lists_available_expedition_fields() {
        let full = Expedition {
            id: String::from("exp-1"),
            awb_number: Some(String::from("AWB9")),
            status: Some(String::from("Created")),
        };
        let bare = Expedition {
            id: String::from("exp-2"),
            awb_number: None,
            status: None,
        };

        assert_eq!(
            expedition_note(&full),
            "Courier expedition created successfully. ID: exp-1, AWB: AWB9, Status: Created"
        );
        assert_eq!(
            expedition_note(&bare),
            "Courier expedition created successfully. ID: exp-2"
        );
    }
}
