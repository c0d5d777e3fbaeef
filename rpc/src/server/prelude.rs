//!
//! Convenience module exporting the types most commonly needed to stand up
//! an RPC server: [`RpcServer`](super::RpcServer), the binder types and the
//! [`method!`](super::method) macro.
//!
pub use crate::envelope::{CallId, RequestEnvelope, ResponseEnvelope};
pub use crate::error::ServerError;
pub use crate::result::ServerResult;
pub use crate::server::*;
