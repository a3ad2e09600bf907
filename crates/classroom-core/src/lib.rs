//! Live-class core: transport-agnostic wire protocol and error types.
//!
//! This crate defines the event contracts and error surface shared by the
//! gateway and its tests. It carries no transport or runtime dependencies so
//! the protocol can be reused by clients and tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `ClassroomError`/`Result` so a hostile frame
//! never takes the gateway down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ClassroomError, ClientCode, Result};
