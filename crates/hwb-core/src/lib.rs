//! Core logic for the homework status relay.
//!
//! The review API and the messenger live behind ports (traits) implemented in
//! adapter crates, so the driver loop can be exercised with fakes.

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod notifier;
pub mod poller;
pub mod status;
pub mod validation;

pub use errors::{Error, ErrorKind, Result, ShapeError, StatusError};

#[doc(hidden)]
pub use tracing;
