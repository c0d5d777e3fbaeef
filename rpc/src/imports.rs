pub use ahash::AHashMap;
pub use core::time::Duration;
pub use downcast_rs::{impl_downcast, DowncastSync};
pub use futures::Future;
pub use serde::{de::DeserializeOwned, Deserialize, Serialize};
pub use serde_json::{self, Value};
pub use std::fmt::Debug;
pub use std::pin::Pin;
pub use std::sync::{Arc, Mutex};
pub use duplex_rpc_core::channel::oneshot;
pub use duplex_rpc_log::{log_error, log_trace};

pub use crate::envelope::CallId;
pub use crate::error::ServerError;
pub use crate::result::ServerResult;
