//!
//! [`enum@Error`] enum declaration for server-side WebSocket errors.
//!
use thiserror::Error;

/// Errors produced by the [`Connection`](super::Connection) and [`ConnectionServer`](super::ConnectionServer).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Listen(String),

    /// WebSocket error produced by the underlying
    /// Tungstenite WebSocket crate
    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] tungstenite::Error),

    /// Connection terminated abnormally
    #[error("Connection closed abnormally")]
    AbnormalClose,

    #[error("Error signaling listener shutdown: {0}")]
    Stop(String),
    #[error("Error signaling listener shutdown: {0}")]
    Done(String),
    #[error("Error waiting for listener shutdown: {0}")]
    Join(String),
}
