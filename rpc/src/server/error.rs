//! [`enum@Error`] declarations for the [`server`](super) module.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] duplex_rpc_transport::server::Error),
}
