//! Session token lifecycle against `POST /auth/login`.
//!
//! The access token and its absolute expiry live in the option store so every
//! process sharing the store shares the session. A token is used only while
//! it expires more than [`EXPIRY_BUFFER_SECS`] from now; otherwise the stored
//! credentials are used for one silent re-login.

use std::sync::Arc;

use livraria_store::{OptionStore, StoreError};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::option_names;
use crate::domain::quote::scalar_to_string;
use crate::domain::UtcDateTime;
use crate::error::{ApiErrorKind, ValidationError};
use crate::http_client::{HttpAuth, HttpMethod};
use crate::transport::CourierTransport;

/// Seconds before expiry at which a token is treated as expired.
pub const EXPIRY_BUFFER_SECS: i64 = 300;
/// Token lifetime assumed when the login response does not carry one.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

const LOGIN_ENDPOINT: &str = "/auth/login";
const NO_RESPONSE: &str = "No response from server";
const INVALID_CREDENTIALS: &str = "Invalid credentials or server error";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persisted access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    /// Absolute expiry in unix seconds.
    pub expires_at: i64,
}

impl SessionToken {
    /// Whether the token stays valid beyond the refresh buffer.
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at > now.saturating_add(EXPIRY_BUFFER_SECS)
    }
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResult {
    pub success: bool,
    pub message: String,
    /// False when nothing usable came back from the server.
    #[serde(skip)]
    pub response_received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl LoginResult {
    fn failed(reason: &str, response_received: bool) -> Self {
        Self {
            success: false,
            message: format!("Login failed: {reason}"),
            response_received,
            expires_at: None,
        }
    }
}

/// Acquires, refreshes and clears the courier session token.
pub struct TokenManager {
    transport: CourierTransport,
    options: Arc<dyn OptionStore>,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(transport: CourierTransport, options: Arc<dyn OptionStore>) -> Self {
        Self {
            transport,
            options,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn transport(&self) -> &CourierTransport {
        &self.transport
    }

    /// Exchange credentials for a token and persist it with its expiry.
    pub async fn login(&self, username: &str, password: &str) -> LoginResult {
        let body = json!({ "email": username, "password": password });
        let response = self
            .transport
            .send(HttpMethod::Post, LOGIN_ENDPOINT, Some(&body), &HttpAuth::None)
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                return match (error.kind(), error.server_message()) {
                    (ApiErrorKind::HttpStatus, Some(message)) => LoginResult::failed(message, true),
                    (ApiErrorKind::HttpStatus, None) => LoginResult::failed(INVALID_CREDENTIALS, true),
                    _ => LoginResult::failed(NO_RESPONSE, false),
                };
            }
        };

        let Some((token, lifetime)) = token_from_response(&response) else {
            let reason = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(INVALID_CREDENTIALS);
            tracing::warn!("login response carried no token");
            return LoginResult::failed(reason, true);
        };

        let expires_at = UtcDateTime::now().unix_timestamp() + lifetime;
        if let Err(error) = self.store_token(&token, expires_at) {
            tracing::error!(error = %error, "failed to persist session token");
            return LoginResult::failed("could not store session token", true);
        }

        tracing::info!(expires_at, "login succeeded");
        LoginResult {
            success: true,
            message: String::from("Login successful"),
            response_received: true,
            expires_at: Some(expires_at),
        }
    }

    /// True when a token valid beyond the refresh buffer is available,
    /// logging in with stored credentials first if needed.
    pub async fn ensure_valid_token(&self) -> bool {
        self.access_token().await.is_some()
    }

    /// A token valid beyond the refresh buffer. At most one login is attempted
    /// and concurrent callers share it.
    pub async fn access_token(&self) -> Option<String> {
        if let Some(token) = self.fresh_token() {
            return Some(token);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.fresh_token() {
            return Some(token);
        }

        let credentials = match self.stored_credentials() {
            Ok(credentials) => credentials,
            Err(error) => {
                tracing::error!(error = %error, "failed to read stored credentials");
                None
            }
        };
        let Some((username, password)) = credentials else {
            tracing::warn!("No credentials stored for token refresh");
            return None;
        };

        tracing::info!("session token expired or missing, logging in again");
        let result = self.login(&username, &password).await;
        if !result.success {
            tracing::warn!(message = %result.message, "token refresh failed");
            return None;
        }
        self.fresh_token()
    }

    /// Forget the session token. The server is not contacted.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.options.delete_option(option_names::API_TOKEN)?;
        self.options.delete_option(option_names::TOKEN_EXPIRES_AT)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Configure the base URL and log in; on success store or forget the
    /// credentials depending on `remember`.
    pub async fn sign_in(
        &self,
        base_url: &str,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<LoginResult, SessionError> {
        if [base_url, username, password]
            .iter()
            .any(|value| value.trim().is_empty())
        {
            return Err(ValidationError::MissingSignInFields.into());
        }

        self.options
            .set_option(option_names::API_BASE_URL, base_url.trim())?;
        self.transport.set_base_url(base_url);

        let result = self.login(username.trim(), password).await;
        if !result.success {
            return Ok(result);
        }

        self.options.set_option(
            option_names::REMEMBER_CREDENTIALS,
            if remember { "1" } else { "0" },
        )?;
        if remember {
            self.options
                .set_option(option_names::API_USERNAME, username.trim())?;
            self.options
                .set_option(option_names::API_PASSWORD, password)?;
        } else {
            self.options.delete_option(option_names::API_USERNAME)?;
            self.options.delete_option(option_names::API_PASSWORD)?;
        }

        Ok(result)
    }

    /// Token currently in the store, fresh or not.
    pub fn current_token(&self) -> Result<Option<SessionToken>, StoreError> {
        let Some(value) = self
            .options
            .get_option(option_names::API_TOKEN)?
            .filter(|value| !value.is_empty())
        else {
            return Ok(None);
        };
        let expires_at = self
            .options
            .get_option(option_names::TOKEN_EXPIRES_AT)?
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Ok(Some(SessionToken { value, expires_at }))
    }

    fn fresh_token(&self) -> Option<String> {
        let now = UtcDateTime::now().unix_timestamp();
        match self.current_token() {
            Ok(token) => token
                .filter(|token| token.is_fresh(now))
                .map(|token| token.value),
            Err(error) => {
                tracing::error!(error = %error, "failed to read session token");
                None
            }
        }
    }

    fn store_token(&self, token: &str, expires_at: i64) -> Result<(), StoreError> {
        self.options.set_option(option_names::API_TOKEN, token)?;
        self.options
            .set_option(option_names::TOKEN_EXPIRES_AT, &expires_at.to_string())
    }

    fn stored_credentials(&self) -> Result<Option<(String, String)>, StoreError> {
        let username = self.options.get_option(option_names::API_USERNAME)?;
        let password = self.options.get_option(option_names::API_PASSWORD)?;
        Ok(match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        })
    }
}

/// Token and lifetime from any of the accepted login response shapes.
pub fn token_from_response(response: &Value) -> Option<(String, i64)> {
    let wrapped = response
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        .then(|| response.get("data"))
        .flatten()
        .and_then(|data| {
            let token = data.get("accessToken").and_then(scalar_to_string)?;
            Some((token, lifetime(data.get("expiresIn"))))
        });

    wrapped
        .or_else(|| {
            let token = response.get("access_token").and_then(scalar_to_string)?;
            Some((token, lifetime(response.get("expires_in"))))
        })
        .or_else(|| {
            let token = response.get("accessToken").and_then(scalar_to_string)?;
            Some((token, lifetime(response.get("expiresIn"))))
        })
        .or_else(|| {
            let token = response.get("token").and_then(scalar_to_string)?;
            Some((token, DEFAULT_TOKEN_LIFETIME_SECS))
        })
}

fn lifetime(value: Option<&Value>) -> i64 {
    value
        .and_then(|value| match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .filter(|seconds| *seconds > 0)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_token_shape() {
        assert_eq!(
            token_from_response(&json!({"success": true, "data": {"accessToken": "a", "expiresIn": 600}})),
            Some((String::from("a"), 600))
        );
        assert_eq!(
            token_from_response(&json!({"access_token": "b", "expires_in": "1200"})),
            Some((String::from("b"), 1200))
        );
        assert_eq!(
            token_from_response(&json!({"accessToken": "c"})),
            Some((String::from("c"), 3600))
        );
        assert_eq!(
            token_from_response(&json!({"token": "d"})),
            Some((String::from("d"), 3600))
        );
        assert_eq!(token_from_response(&json!({"message": "nope"})), None);
    }

    #[test]
    fn wrapped_shape_requires_success_flag() {
        assert_eq!(
            token_from_response(&json!({"success": false, "data": {"accessToken": "a"}})),
            None
        );
    }

    #[test]
    fn freshness_honours_refresh_buffer() {
        let token = SessionToken {
            value: String::from("t"),
            expires_at: 1_000 + EXPIRY_BUFFER_SECS,
        };

        assert!(!token.is_fresh(1_000));
        assert!(token.is_fresh(999));
    }
}
