//!
//! Common [`enum@Error`] and [`enum@ServerError`] definitions shared by the
//! [`super::server`] module.
//!

use std::sync::PoisonError;
use thiserror::Error;
use duplex_rpc_core::channel::{RecvError, SendError, TrySendError};

///
/// [`ServerError`] enumerates the ways a local or remote RPC call can fail.
/// It is serialized to a plain string when transported to a peer as a
/// response envelope's `error` field.
///
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ServerError {
    /// the connection was closed before a response arrived
    #[error("connection is closed")]
    Close,
    /// the requested function name has no registered handler
    #[error("method not found: {0}")]
    NotFound(String),
    /// a method with this name is already registered
    #[error("RPC method {0} is already declared")]
    Duplicate(String),
    /// resource lock error
    #[error("resource lock error")]
    PoisonError,
    /// the positional argument array could not be decoded into the handler's parameters
    #[error("argument decode error: {0}")]
    ArgumentDecode(String),
    /// the handler's return value could not be serialized
    #[error("response serialization error")]
    RespSerialize,
    /// a response's `returnValue` could not be decoded into the expected type
    #[error("return value decode error: {0}")]
    Decode(String),
    /// the peer returned an application-level error for this call
    #[error("remote error: {0}")]
    Remote(String),
    /// the call was cancelled locally before it completed
    #[error("call cancelled")]
    Cancelled,
    /// sending the envelope over the connection failed
    #[error("send failure: {0}")]
    SendFailure(String),
}

impl<T> From<PoisonError<T>> for ServerError {
    fn from(_error: PoisonError<T>) -> ServerError {
        ServerError::PoisonError
    }
}

impl From<duplex_rpc_transport::server::Error> for ServerError {
    fn from(error: duplex_rpc_transport::server::Error) -> Self {
        ServerError::SendFailure(error.to_string())
    }
}

impl From<RecvError> for ServerError {
    fn from(_: RecvError) -> ServerError {
        ServerError::Close
    }
}

impl<T> From<SendError<T>> for ServerError {
    fn from(_error: SendError<T>) -> ServerError {
        ServerError::SendFailure("channel closed".to_string())
    }
}

impl<T> From<TrySendError<T>> for ServerError {
    fn from(_error: TrySendError<T>) -> ServerError {
        ServerError::SendFailure("channel closed".to_string())
    }
}
