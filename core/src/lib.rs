//!
//! [`duplex_rpc_core`] provides the small set of async primitives shared by the
//! duplex-rpc crates:
//! - async channels ([`channel`])
//! - task spawn and sleep functions ([`task`])
//! - async-friendly, threadsafe event triggers ([`trigger`])
//!

extern crate self as duplex_rpc_core;

/// channel re-exports and shims
pub mod channel;
/// task spawn and sleep functions
pub mod task;
/// trigger crate re-exports and shims
pub mod trigger;
