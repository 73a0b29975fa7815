//! Courier API façade.
//!
//! | Operation | Method | Endpoint | Auth |
//! |-----------|--------|----------|------|
//! | [`ApiClient::create_quote_request`] | POST | `/public/awb/quotes` | bearer |
//! | [`ApiClient::select_courier_quote`] | POST | `/public/awb/quotes/select` | bearer |
//! | [`ApiClient::attach_billing_info_from_sender_profile`] | POST | `/public/awb/quotes/billing-info` | bearer |
//! | [`ApiClient::create_expedition`] | POST | `/expedition` | bearer |
//! | [`ApiClient::get_expedition_by_id`] | GET | `/expedition/:id` | bearer |
//! | [`ApiClient::get_expedition_by_tracking`] | GET | `/expedition/tracking?trackingNumber=` | bearer |
//! | [`ApiClient::list_expeditions`] | GET | `/expedition` | bearer |
//! | [`ApiClient::get_user_info`] | GET | `/users/me` | bearer |
//! | [`ApiClient::get_sender_profile`] | GET | `/users/me/sender-profile` | bearer |
//! | [`ApiClient::get_available_couriers`] | GET | `/public/couriers` | none |

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::domain::UtcDateTime;
use crate::error::{ApiError, ValidationError};
use crate::http_client::{HttpAuth, HttpMethod};
use crate::network::{rewrite_loopback, RuntimeEnvironment};
use crate::payload::{
    BillingInfoPayload, CreateExpeditionPayload, InlineExpeditionPayload, QuoteRequestPayload,
    SelectQuotePayload,
};
use crate::session::TokenManager;
use crate::transport::CourierTransport;

const DOCKER_HINT: &str = "Tip: In Docker, use \"host.docker.internal\" instead of \"localhost\".";

/// Result of a reachability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ConnectivityDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityDetails {
    pub url: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Result of a login check with an authenticated probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginCheck {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<String>,
}

impl LoginCheck {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token_expires_at: None,
        }
    }
}

/// Authenticated and unauthenticated calls against the courier API.
#[derive(Clone)]
pub struct ApiClient {
    transport: CourierTransport,
    tokens: Arc<TokenManager>,
}

impl ApiClient {
    pub fn new(tokens: Arc<TokenManager>) -> Self {
        Self {
            transport: tokens.transport().clone(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// A base URL is set and a session token is stored.
    pub fn is_configured(&self) -> bool {
        self.transport.is_configured()
            && matches!(self.tokens.current_token(), Ok(Some(_)))
    }

    /// Call an endpoint without authentication.
    pub async fn raw_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.transport
            .send(method, endpoint, body, &HttpAuth::None)
            .await
    }

    /// Call an endpoint with a bearer token, refreshing the session first when
    /// needed. Without a valid token the endpoint is not contacted.
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        if !self.transport.is_configured() {
            tracing::error!("API base URL not configured");
            return Err(ApiError::not_configured());
        }

        let Some(token) = self.tokens.access_token().await else {
            tracing::error!("Unable to obtain valid API token");
            return Err(ApiError::unauthenticated());
        };

        self.transport
            .send(method, endpoint, body, &HttpAuth::BearerToken(token))
            .await
    }

    pub async fn create_quote_request(&self, payload: &QuoteRequestPayload) -> Result<Value, ApiError> {
        self.post("/public/awb/quotes", payload).await
    }

    pub async fn select_courier_quote(
        &self,
        quote_request_id: &str,
        quote_id: &str,
    ) -> Result<Value, ApiError> {
        let payload = SelectQuotePayload {
            quote_request_id: quote_request_id.to_owned(),
            courier_quote_id: quote_id.to_owned(),
        };
        self.post("/public/awb/quotes/select", &payload).await
    }

    pub async fn attach_billing_info_from_sender_profile(
        &self,
        quote_request_id: &str,
        sender_profile_id: &str,
    ) -> Result<Value, ApiError> {
        let payload = BillingInfoPayload {
            quote_request_id: quote_request_id.to_owned(),
            sender_profile_id: sender_profile_id.to_owned(),
        };
        self.post("/public/awb/quotes/billing-info", &payload).await
    }

    pub async fn create_expedition(&self, payload: &CreateExpeditionPayload) -> Result<Value, ApiError> {
        self.post("/expedition", payload).await
    }

    /// Create an expedition carrying billing details inline.
    pub async fn create_inline_expedition(
        &self,
        payload: &InlineExpeditionPayload,
    ) -> Result<Value, ApiError> {
        self.post("/expedition", payload).await
    }

    pub async fn get_expedition_by_id(&self, expedition_id: &str) -> Result<Value, ApiError> {
        let endpoint = format!("/expedition/{}", urlencoding::encode(expedition_id));
        self.request(HttpMethod::Get, &endpoint, None).await
    }

    pub async fn get_expedition_by_tracking(&self, tracking_number: &str) -> Result<Value, ApiError> {
        let endpoint = format!(
            "/expedition/tracking?trackingNumber={}",
            urlencoding::encode(tracking_number)
        );
        self.request(HttpMethod::Get, &endpoint, None).await
    }

    pub async fn list_expeditions(&self) -> Result<Value, ApiError> {
        self.request(HttpMethod::Get, "/expedition", None).await
    }

    pub async fn get_user_info(&self) -> Result<Value, ApiError> {
        self.request(HttpMethod::Get, "/users/me", None).await
    }

    pub async fn get_sender_profile(&self) -> Result<Value, ApiError> {
        self.request(HttpMethod::Get, "/users/me/sender-profile", None)
            .await
    }

    /// Public courier list; no session needed.
    pub async fn get_available_couriers(&self) -> Result<Value, ApiError> {
        self.raw_request(HttpMethod::Get, "/public/couriers", None)
            .await
    }

    /// Bare GET of the base URL. Any HTTP status means the server is reachable.
    pub async fn test_connectivity(&self) -> ConnectivityReport {
        let config = self.transport.config();
        if !config.is_configured() {
            return ConnectivityReport {
                success: false,
                message: String::from("API base URL not configured"),
                details: None,
            };
        }

        let original_url = config.base_url.clone();
        let resolved = self.transport.environment().resolve_url(&original_url);
        let rewritten = resolved != original_url;
        if rewritten {
            tracing::debug!(from = %original_url, to = %resolved, "container detected, rewrote base URL");
        }
        let url = format!("{}/", resolved.trim_end_matches('/'));

        tracing::debug!(url = %url, "testing connectivity");
        match self.transport.probe(&url, config.connectivity_timeout_ms).await {
            Ok(response) => ConnectivityReport {
                success: true,
                message: format!("Server is reachable (HTTP {})", response.status),
                details: Some(ConnectivityDetails {
                    url,
                    original_url,
                    response_code: Some(response.status),
                    error_message: None,
                }),
            },
            Err(error) => {
                tracing::debug!(error = %error, "connectivity test failed");
                let mut message = format!("Network error: {error}");
                if rewritten && rewrite_loopback(&original_url).is_some() {
                    message.push_str(&format!(
                        ". {DOCKER_HINT} The URL was automatically converted to: {url}"
                    ));
                }
                ConnectivityReport {
                    success: false,
                    message,
                    details: Some(ConnectivityDetails {
                        url,
                        original_url,
                        response_code: None,
                        error_message: Some(error.message().to_owned()),
                    }),
                }
            }
        }
    }

    /// Log in with the given credentials, then confirm the token opens an
    /// authenticated endpoint.
    pub async fn test_login(&self, username: &str, password: &str) -> LoginCheck {
        if username.trim().is_empty() || password.is_empty() {
            return LoginCheck::failed(ValidationError::MissingCredentials.to_string());
        }

        let login = self.tokens.login(username.trim(), password).await;
        if !login.success {
            let mut message = login.message;
            if !login.response_received {
                message.push_str(" (No response from server - check URL and network)");
            }
            return LoginCheck::failed(message);
        }

        match self.list_expeditions().await {
            Ok(_) => LoginCheck {
                success: true,
                message: String::from(
                    "Authentication successful! Login works and API access confirmed.",
                ),
                token_expires_at: login
                    .expires_at
                    .and_then(UtcDateTime::from_unix_timestamp)
                    .map(UtcDateTime::format_record),
            },
            Err(error) => {
                tracing::warn!(code = error.code(), "authenticated probe failed");
                LoginCheck::failed("Login successful but API access failed. Check API permissions.")
            }
        }
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.transport.environment()
    }

    async fn post<T: Serialize>(&self, endpoint: &str, payload: &T) -> Result<Value, ApiError> {
        let body = serde_json::to_value(payload).map_err(|error| {
            ApiError::transport(format!("failed to encode request body: {error}"))
        })?;
        self.request(HttpMethod::Post, endpoint, Some(&body)).await
    }
}
