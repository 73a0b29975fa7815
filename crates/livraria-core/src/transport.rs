//! JSON exchange with the courier API over an [`HttpClient`].

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::config::CourierConfig;
use crate::error::ApiError;
use crate::http_client::{HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use crate::network::RuntimeEnvironment;

/// Shared request plumbing for the token manager and the API client.
#[derive(Clone)]
pub struct CourierTransport {
    http: Arc<dyn HttpClient>,
    config: Arc<RwLock<CourierConfig>>,
    environment: RuntimeEnvironment,
}

impl CourierTransport {
    pub fn new(
        http: Arc<dyn HttpClient>,
        config: CourierConfig,
        environment: RuntimeEnvironment,
    ) -> Self {
        Self {
            http,
            config: Arc::new(RwLock::new(config)),
            environment,
        }
    }

    pub fn config(&self) -> CourierConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point every clone of this transport at a new base URL.
    pub fn set_base_url(&self, base_url: &str) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.base_url = CourierConfig::new(base_url).base_url;
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    pub fn is_configured(&self) -> bool {
        self.config().is_configured()
    }

    /// Configured base URL, rewritten for the runtime environment.
    pub fn resolved_base_url(&self) -> Option<String> {
        let config = self.config();
        if config.is_configured() {
            Some(self.environment.resolve_url(&config.base_url))
        } else {
            None
        }
    }

    /// Send one JSON request and decode the JSON answer.
    ///
    /// Non-2xx statuses, transport failures and undecodable bodies are all
    /// errors; nothing is retried.
    pub async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        auth: &HttpAuth,
    ) -> Result<Value, ApiError> {
        let config = self.config();
        let Some(base_url) = self.resolved_base_url() else {
            tracing::error!("API base URL not configured");
            return Err(ApiError::not_configured());
        };
        let url = format!("{base_url}{endpoint}");

        let mut request = HttpRequest::new(method, url.as_str())
            .with_json_headers()
            .with_auth(auth)
            .with_timeout_ms(config.request_timeout_ms);

        if let Some(body) = body.filter(|_| method.carries_body()) {
            request = request.with_body(serde_json::to_string(body).map_err(|error| {
                ApiError::transport(format!("failed to encode request body: {error}"))
            })?);
            tracing::debug!(%method, url = %url, "API request with body");
        } else {
            tracing::debug!(%method, url = %url, "API request");
        }

        let response = self.http.execute(request).await.map_err(|error| {
            tracing::error!(%method, url = %url, error = %error, "API request failed");
            ApiError::transport(error.message())
        })?;

        tracing::debug!(status = response.status, "API response");
        decode_response(&response)
    }

    /// Bare GET used for reachability checks. Any HTTP answer is returned.
    pub async fn probe(&self, url: &str, timeout_ms: u64) -> Result<HttpResponse, HttpError> {
        self.http
            .execute(HttpRequest::get(url).with_timeout_ms(timeout_ms))
            .await
    }
}

fn decode_response(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.is_success() {
        return serde_json::from_str(&response.body).map_err(|error| {
            tracing::error!(error = %error, "Invalid JSON response");
            ApiError::invalid_json(format!("Invalid JSON response: {error}"))
        });
    }

    let server_message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned));
    let error = ApiError::http_status(response.status, server_message, &response.body);
    tracing::error!(status = response.status, "{}", error.message());
    Err(error)
}
