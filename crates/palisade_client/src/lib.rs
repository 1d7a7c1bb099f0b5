//! # Palisade Management Client
//!
//! The command layer over the Palisade object model:
//!
//! - **Transport**: the [`Transport`] seam carries `post(command, body)`
//!   round trips; anything from an HTTP client to a scripted test double
//!   plugs in behind it.
//! - **Session**: [`Session`] derives command names from object
//!   discriminators and reconciles responses back into the instances the
//!   caller holds, so `add` fills in the uid and `update` clears the
//!   dirty set exactly when the server acknowledged the write.
//! - **Paging**: [`Page`] walks offset/limit listing windows, and
//!   rulebase windows arrive with their referenced objects unified
//!   through one shared parse per window.
//!
//! Errors split along the same lines: [`ClientError::Api`] for commands
//! the server rejected, [`ClientError::Protocol`] for answers outside the
//! wire contract, and transport failures below both.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod paging;
mod rulebase;
mod session;
mod transport;

pub use config::SessionConfig;
pub use error::{ClientError, ClientResult};
pub use paging::{ListingQuery, Order, Page};
pub use session::Session;
pub use transport::{Transport, TransportError};
