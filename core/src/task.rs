//!
//! [`task`](self) module provides helper functions for spawning and suspending
//! tasks on the tokio runtime:
//! - [`spawn()`] - non-blocking spawn of the supplied future
//! - [`sleep()`] - suspends the task for a given Duration
//! - [`yield_now()`] - yields to the tokio executor
//!

use futures::Future;

pub use tokio::task::yield_now;
pub use tokio::time::sleep;

pub fn spawn<F, T>(future: F)
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn(future);
}
