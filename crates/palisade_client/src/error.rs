//! Error types for the client layer.

use palisade_model::ModelError;
use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server was unreachable or answered outside the API contract.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server rejected a command with a structured error.
    #[error("command `{command}` failed: {code}: {message}")]
    Api {
        /// The command that was posted.
        command: String,
        /// The machine-readable error code.
        code: String,
        /// The human-readable message.
        message: String,
    },

    /// The response body did not have the promised shape.
    #[error("protocol violation in `{command}`: {detail}")]
    Protocol {
        /// The command whose response was malformed.
        command: String,
        /// What was wrong with it.
        detail: String,
    },

    /// The operation does not apply to the object in its current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Parsing or serializing the object graph failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ClientError {
    /// Builds an [`ClientError::Api`] from a structured error body,
    /// falling back to the raw body text when the structure is absent.
    pub(crate) fn from_api(command: &str, body: &Value) -> Self {
        let code = body
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned();
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| body.to_string());
        ClientError::Api {
            command: command.to_owned(),
            code,
            message,
        }
    }

    pub(crate) fn protocol(command: &str, detail: impl Into<String>) -> Self {
        ClientError::Protocol {
            command: command.to_owned(),
            detail: detail.into(),
        }
    }
}

/// Convenience alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;
