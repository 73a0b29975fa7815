use std::fmt::{Display, Formatter};

use livraria_store::StoreError;
use thiserror::Error;

use crate::orders::OrderSourceError;
use crate::sender::SenderAddressError;

/// Validation errors for values read from configuration or the command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid quote selection policy '{value}', expected first, cheapest or fastest")]
    InvalidSelectionPolicy { value: String },

    #[error("invalid custom expedition data: {reason}")]
    InvalidCustomData { reason: String },

    #[error("Username and password are required")]
    MissingCredentials,

    #[error("API URL, username, and password are required")]
    MissingSignInFields,
}

/// Courier API failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No base URL is configured.
    NotConfigured,
    /// No valid session token could be obtained.
    Unauthenticated,
    /// Nothing came back from the server.
    Transport,
    /// The server answered with a non-2xx status.
    HttpStatus,
    /// The server answered 2xx with a body that is not JSON.
    InvalidJson,
}

/// Structured courier API error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    status: Option<u16>,
    server_message: Option<String>,
}

impl ApiError {
    pub fn not_configured() -> Self {
        Self {
            kind: ApiErrorKind::NotConfigured,
            message: String::from("API base URL not configured"),
            status: None,
            server_message: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            kind: ApiErrorKind::Unauthenticated,
            message: String::from("No valid authentication token"),
            status: None,
            server_message: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            message: message.into(),
            status: None,
            server_message: None,
        }
    }

    /// Non-2xx response. The message is `HTTP <code>: <server message or body>`,
    /// or just `HTTP <code>` for an empty body.
    pub fn http_status(status: u16, server_message: Option<String>, body: &str) -> Self {
        let detail = server_message.as_deref().unwrap_or(body).trim();
        let message = if detail.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {detail}")
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            status: Some(status),
            server_message,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::InvalidJson,
            message: message.into(),
            status: None,
            server_message: None,
        }
    }

    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// The `message` field of a structured error payload, when present.
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ApiErrorKind::NotConfigured => "api.not_configured",
            ApiErrorKind::Unauthenticated => "api.unauthenticated",
            ApiErrorKind::Transport => "api.transport",
            ApiErrorKind::HttpStatus => "api.http_status",
            ApiErrorKind::InvalidJson => "api.invalid_json",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ApiError {}

/// Errors surfaced by the quote/expedition orchestrator. The display text of
/// each variant is the message returned to the operator.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Order not found")]
    OrderNotFound(u64),

    #[error(
        "Order is missing required information: {}. Please complete these fields in the order (shipping address for delivery details, billing for contact info).",
        .labels.join(", ")
    )]
    MissingOrderFields { labels: Vec<&'static str> },

    #[error("Expedition already exists for this order")]
    ExpeditionExists,

    #[error("No couriers available")]
    NoCouriers,

    #[error("Failed to create quote request or get courier quotes")]
    QuoteRequestFailed(#[source] ApiError),

    #[error("Quote request ID not found in response")]
    MissingQuoteRequestId,

    #[error("No courier quotes available")]
    NoQuotes,

    #[error("No quote request found for this order")]
    NoQuoteRequest,

    #[error("Quote request ID does not match the latest quote request for this order")]
    QuoteRequestMismatch,

    #[error("Quote is not available for this quote request")]
    UnknownQuote,

    #[error("Failed to select quote")]
    SelectFailed(#[source] ApiError),

    #[error("Quote request ID or selected quote ID not found")]
    MissingQuoteSelection,

    #[error("No default sender profile configured")]
    NoDefaultSenderProfile,

    #[error("Failed to attach billing information from sender profile")]
    BillingAttachFailed,

    #[error("Failed to create expedition")]
    ExpeditionCreateFailed,

    #[error("No AWB number found")]
    NoAwb,

    #[error("Failed to get expedition status")]
    StatusFetchFailed,

    #[error(transparent)]
    SenderAddress(#[from] SenderAddressError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Orders(#[from] OrderSourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    /// Stable machine-readable code for logs and CLI output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) => "order.not_found",
            Self::MissingOrderFields { .. } => "order.missing_fields",
            Self::ExpeditionExists => "expedition.exists",
            Self::NoCouriers => "quote.no_couriers",
            Self::QuoteRequestFailed(_) => "quote.request_failed",
            Self::MissingQuoteRequestId => "quote.missing_request_id",
            Self::NoQuotes => "quote.empty",
            Self::NoQuoteRequest => "quote.no_request",
            Self::QuoteRequestMismatch => "quote.request_mismatch",
            Self::UnknownQuote => "quote.unknown",
            Self::SelectFailed(_) => "quote.select_failed",
            Self::MissingQuoteSelection => "quote.missing_selection",
            Self::NoDefaultSenderProfile => "sender.no_default_profile",
            Self::BillingAttachFailed => "billing.attach_failed",
            Self::ExpeditionCreateFailed => "expedition.create_failed",
            Self::NoAwb => "expedition.no_awb",
            Self::StatusFetchFailed => "expedition.status_failed",
            Self::SenderAddress(_) => "sender.address_incomplete",
            Self::Validation(_) => "validation",
            Self::Api(error) => error.code(),
            Self::Orders(_) => "order.source",
            Self::Store(_) => "store",
            Self::Serialization(_) => "serialization",
        }
    }
}
