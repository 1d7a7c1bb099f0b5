//! Server-assigned object identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A server-assigned unique identifier.
///
/// The management server mints one when an object is created and uses it as
/// the canonical identity everywhere afterwards. Clients treat it as opaque
/// text: it is compared, hashed and echoed in requests, never inspected.
/// Locally created objects have no `Uid` until the server acknowledges them.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wraps a raw identifier string.
    pub fn new(raw: impl Into<String>) -> Self {
        Uid(raw.into())
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({})", self.0)
    }
}

impl From<&str> for Uid {
    fn from(raw: &str) -> Self {
        Uid::new(raw)
    }
}

impl From<String> for Uid {
    fn from(raw: String) -> Self {
        Uid(raw)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
