//! Uniform `{success, message, data?}` result returned to operators.

use serde::Serialize;
use serde_json::Value;

use crate::error::HandlerError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Outcome {
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Wrap an orchestrator result. Successful values are serialized into
    /// `data`; errors keep their operator-facing message.
    pub fn from_result<T: Serialize>(
        result: Result<T, HandlerError>,
        success_message: &str,
    ) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(data) => Self::ok(success_message, Some(data)),
                Err(error) => Self::failure(format!("serialization error: {error}")),
            },
            Err(error) => Self::from_error(&error),
        }
    }

    pub fn from_error(error: &HandlerError) -> Self {
        let message = match error {
            HandlerError::Api(api) => api.message().to_owned(),
            other => other.to_string(),
        };
        Self::failure(message)
    }
}
