//! Top-level facade crate for the live-class gateway.
//!
//! Re-exports the wire protocol and the gateway library so users can depend on a single crate.

pub mod core {
    pub use classroom_core::*;
}

pub mod gateway {
    pub use classroom_gateway::*;
}
