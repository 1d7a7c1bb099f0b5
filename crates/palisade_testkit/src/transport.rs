//! A scripted transport double.
//!
//! [`ScriptedTransport`] plays back a fixed sequence of replies and keeps
//! a log of everything posted. Mismatches between the script and the
//! actual commands surface as transport errors rather than panics, so a
//! failing test reports through the code path under test.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use palisade_client::{Transport, TransportError};

/// One recorded round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedCommand {
    /// The command endpoint that was posted to.
    pub command: String,
    /// The request payload.
    pub payload: Value,
}

#[derive(Debug)]
enum Reply {
    Body(Value),
    Reject { status: u16, body: Value },
    Outage(String),
}

#[derive(Debug)]
struct Step {
    command: String,
    reply: Reply,
}

/// Plays back scripted replies in order and records every post.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    log: Mutex<Vec<PostedCommand>>,
}

impl ScriptedTransport {
    /// An empty script. Any post fails as unreachable.
    pub fn new() -> Self {
        ScriptedTransport::default()
    }

    /// Appends a successful reply for `command`.
    pub fn reply(self, command: impl Into<String>, body: Value) -> Self {
        self.push(command.into(), Reply::Body(body));
        self
    }

    /// Appends a rejection for `command` with an error status and body.
    pub fn reject(self, command: impl Into<String>, status: u16, body: Value) -> Self {
        self.push(command.into(), Reply::Reject { status, body });
        self
    }

    /// Appends a connectivity failure for `command`.
    pub fn outage(self, command: impl Into<String>, reason: impl Into<String>) -> Self {
        self.push(command.into(), Reply::Outage(reason.into()));
        self
    }

    fn push(&self, command: String, reply: Reply) {
        self.script.lock().push_back(Step { command, reply });
    }

    /// Everything posted so far, in order.
    pub fn posted(&self) -> Vec<PostedCommand> {
        self.log.lock().clone()
    }

    /// The commands posted so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .map(|post| post.command.clone())
            .collect()
    }

    /// Number of scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn post(&self, command: &str, payload: &Value) -> Result<Value, TransportError> {
        self.log.lock().push(PostedCommand {
            command: command.to_owned(),
            payload: payload.clone(),
        });
        let Some(step) = self.script.lock().pop_front() else {
            return Err(TransportError::Unreachable(format!(
                "script exhausted before `{command}`"
            )));
        };
        if step.command != command {
            return Err(TransportError::Unreachable(format!(
                "script expected `{}`, got `{command}`",
                step.command
            )));
        }
        match step.reply {
            Reply::Body(body) => Ok(body),
            Reply::Reject { status, body } => Err(TransportError::Status { status, body }),
            Reply::Outage(reason) => Err(TransportError::Unreachable(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replies_play_back_in_order() {
        let transport = ScriptedTransport::new()
            .reply("show-host", json!({ "uid": "h1" }))
            .reply("show-network", json!({ "uid": "n1" }));
        assert_eq!(transport.remaining(), 2);

        let first = transport.post("show-host", &json!({})).unwrap();
        assert_eq!(first["uid"], json!("h1"));
        let second = transport.post("show-network", &json!({})).unwrap();
        assert_eq!(second["uid"], json!("n1"));
        assert_eq!(transport.remaining(), 0);
        assert_eq!(transport.commands(), vec!["show-host", "show-network"]);
    }

    #[test]
    fn command_mismatches_fail_without_panicking() {
        let transport = ScriptedTransport::new().reply("show-host", json!({}));
        let err = transport.post("delete-host", &json!({})).unwrap_err();
        assert!(matches!(err, TransportError::Unreachable(_)));
        assert!(err.to_string().contains("show-host"));
    }

    #[test]
    fn exhausted_scripts_fail_without_panicking() {
        let transport = ScriptedTransport::new();
        let err = transport.post("show-host", &json!({})).unwrap_err();
        assert!(matches!(err, TransportError::Unreachable(_)));
    }

    #[test]
    fn rejections_carry_status_and_body() {
        let transport =
            ScriptedTransport::new().reject("add-host", 409, json!({ "code": "err_name_in_use" }));
        let err = transport.post("add-host", &json!({})).unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body["code"], json!("err_name_in_use"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
