//!
//! Native tokio/tungstenite WebSocket server transport.
//!
//! [`server::ConnectionServer`] accepts inbound WebSocket upgrades and hands
//! each handshake's cookies and outbound send queue to a [`server::Connection`],
//! which exposes `receive`/`error`/`close` subscriber lists so higher-level
//! binders (see the `duplex-rpc` crate) can attach without owning the socket.
//!

pub mod server;
