//!
//! Bidirectional JSON-RPC over WebSocket.
//!
//! Peers exchange request/response envelopes as JSON text frames. A request
//! carries a function name, a positional argument array and a call id; the
//! corresponding response carries the same call id paired with either a
//! return value or an error.
//!
//! - [`server::LocalBinder`] registers named methods and dispatches incoming
//!   requests against them.
//! - [`server::RemoteBinder`] issues outbound calls over a connection and
//!   resolves them as responses arrive, timing them out after a configurable
//!   termination delay.
//! - [`server::BinderRegistry`] tracks every connection's binders so the
//!   application can look them up by interface type and broadcast to them.
//!
//! This framework is built on top of [Tokio](https://crates.io/crates/tokio) and
//! [Tungstenite](https://crates.io/crates/tungstenite), using `duplex-rpc-transport`
//! for the underlying WebSocket accept loop and connection plumbing.
//!
//! ### Example
//! ```ignore
//! let builder = LocalBinderBuilder::new()
//!     .method("echo", method!(|value: String| async move { Ok(value) }));
//! builder.build(connection, object, &registry);
//! ```
//!

extern crate self as duplex_rpc;

pub mod envelope;
pub mod error;
mod imports;
pub mod result;
pub mod server;

#[doc(hidden)]
pub use serde_json;
