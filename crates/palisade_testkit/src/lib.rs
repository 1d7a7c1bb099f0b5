//! # Palisade Testkit
//!
//! Test utilities for the Palisade management client.
//!
//! This crate provides:
//! - Response document fixtures for every common object kind
//! - A scripted transport double that records what was posted
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use palisade_testkit::prelude::*;
//!
//! #[test]
//! fn test_against_a_script() {
//!     let transport = ScriptedTransport::new()
//!         .reply("show-host", host_doc(&uid(), "web-srv", "10.0.0.7"));
//!     let session = Session::new(&transport);
//!     // ... session operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::transport::*;
}

pub use fixtures::*;
pub use generators::*;
pub use transport::*;
