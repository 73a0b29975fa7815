//! Core of the livraria courier integration.
//!
//! This crate contains:
//! - Courier API transport, session token lifecycle and endpoint façade
//! - Courier id cache
//! - Order-to-quote-request mapping and sender address resolution
//! - Quote/expedition orchestration with deferred auto-create
//! - Result envelope and structured errors

pub mod api_client;
pub mod auto_create;
pub mod cache;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod network;
pub mod normalize;
pub mod orchestrator;
pub mod orders;
pub mod payload;
pub mod sender;
pub mod session;
pub mod transport;

pub use api_client::{ApiClient, ConnectivityDetails, ConnectivityReport, LoginCheck};
pub use auto_create::{intent_key, AutoCreateQueue, AutoCreateRun, INTENT_TTL};
pub use cache::{CourierIdCache, COURIER_IDS_TRANSIENT, COURIER_IDS_TTL};
pub use config::{
    option_names, update_allowed_option, ConfigError, CourierConfig, PackageDefaults,
    SenderSettings, Settings, UPDATABLE_OPTIONS,
};
pub use domain::{
    CourierQuote, CustomExpeditionData, Expedition, ExpeditionRecord, ExpeditionState, LineItem,
    Order, OrderAddress, PackageDimensions, SelectionPolicy, UtcDateTime,
};
pub use envelope::Outcome;
pub use error::{ApiError, ApiErrorKind, HandlerError, ValidationError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use livraria_store::{MemoryStore, OptionStore, OrderMetaStore, StoreError};
pub use network::RuntimeEnvironment;
pub use orchestrator::{
    meta_keys, AutoCreateOutcome, ExpeditionResult, OrderHandler, QuotesResult, SelectionResult,
    StatusResult,
};
pub use orders::{MemoryOrderSource, OrderSource, OrderSourceError};
pub use sender::{PostalAddress, SenderAddressError, SenderProfile};
pub use session::{LoginResult, SessionError, SessionToken, TokenManager};
pub use transport::CourierTransport;
