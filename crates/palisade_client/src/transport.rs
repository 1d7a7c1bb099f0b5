//! The wire seam.
//!
//! Everything the client sends is a POST of one JSON document to one
//! command endpoint, so the whole transport surface is a single method.
//! Production code puts an HTTP client behind it; tests script it.

use serde_json::Value;
use thiserror::Error;

/// Failures below the command layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server could not be reached at all.
    #[error("management server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-success status.
    #[error("management server answered status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, usually a structured error document.
        body: Value,
    },
}

/// Carries commands to the management server.
///
/// Implementations are synchronous and need not be `Send`: a session and
/// the object graph it produces live on one thread.
pub trait Transport {
    /// Posts `payload` to the `command` endpoint and returns the response
    /// body.
    fn post(&self, command: &str, payload: &Value) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, command: &str, payload: &Value) -> Result<Value, TransportError> {
        (**self).post(command, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Transport for Echo {
        fn post(&self, command: &str, payload: &Value) -> Result<Value, TransportError> {
            Ok(json!({ "command": command, "payload": payload }))
        }
    }

    #[test]
    fn references_forward_to_the_inner_transport() {
        fn call(transport: impl Transport) -> Value {
            transport.post("show-host", &json!({})).unwrap()
        }
        let echo = Echo;
        let body = call(&echo);
        assert_eq!(body["command"], json!("show-host"));
    }

    #[test]
    fn errors_render_their_cause() {
        let err = TransportError::Unreachable("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
        let err = TransportError::Status {
            status: 404,
            body: json!({}),
        };
        assert!(err.to_string().contains("404"));
    }
}
