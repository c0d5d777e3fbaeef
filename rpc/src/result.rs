//!
//! Result alias for RPC calls, encapsulating [`super::error::ServerError`]
//!

pub type ServerResult<T> = std::result::Result<T, super::error::ServerError>;
