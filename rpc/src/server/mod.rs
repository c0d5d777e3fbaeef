//!
//! RPC server module (native only). Ties together the local and remote
//! binders, the process-wide [`BinderRegistry`], and
//! [`duplex_rpc_transport::server::ConnectionServer`] into [`RpcServer`].
//!

pub mod error;
mod local_binder;
mod method;
pub mod prelude;
mod registry;
mod remote_binder;
pub mod result;

use crate::imports::*;
pub use duplex_rpc_transport::server::{
    CloseStatus, Connection, ConnectionCounters, ConnectionServer, Message, OnConnect, TcpListener,
    WebSocketConfig,
};

pub use error::Error;
pub use local_binder::{LocalBinder, LocalBinderBuilder};
pub use method::{Method, MethodFn, MethodFnReturn};
pub use registry::{call_many, call_many_void, Binder, BinderRegistry, RemoteBinderAny};
pub use remote_binder::{RemoteBinder, DEFAULT_TERMINATION_DELAY};
pub use result::Result;

///
/// `method!()` builds a [`Method`] from a typed closure, decoding its
/// positional parameters from the request's JSON argument array:
///
/// ```ignore
/// let mut builder = LocalBinderBuilder::new();
/// builder = builder.method("echo", method!(|value: String| async move {
///     Ok(value)
/// }));
/// ```
///
pub use duplex_rpc_macros::server_method as method;

/// Application-facing entry point: accepts inbound WebSocket connections and
/// invokes `on_connect` once per connection so bindings can be installed
/// before any traffic is dispatched (spec'd ordering: binders subscribe to
/// `receive` synchronously inside the callback, so nothing arriving after it
/// returns can race past them).
pub struct RpcServer {
    connection_server: Arc<ConnectionServer>,
    registry: Arc<BinderRegistry>,
}

impl RpcServer {
    pub fn new<F>(
        on_connect: F,
        max_message_size: Option<usize>,
        counters: Option<Arc<ConnectionCounters>>,
    ) -> Arc<Self>
    where
        F: Fn(Arc<Connection>, Arc<BinderRegistry>) + Send + Sync + 'static,
    {
        let registry = BinderRegistry::new();
        let registry_for_callback = registry.clone();
        let on_connect: OnConnect = Arc::new(move |connection| {
            on_connect(connection, registry_for_callback.clone());
        });

        let mut connection_server = ConnectionServer::new(on_connect, counters);
        if let Some(max_message_size) = max_message_size {
            connection_server = connection_server.with_max_message_size(max_message_size);
        }

        Arc::new(RpcServer {
            connection_server,
            registry,
        })
    }

    /// The process-wide binder registry backing this server's connections.
    pub fn registry(&self) -> &Arc<BinderRegistry> {
        &self.registry
    }

    pub fn counters(&self) -> &Arc<ConnectionCounters> {
        &self.connection_server.counters
    }

    pub async fn bind(&self, addr: &str) -> Result<TcpListener> {
        Ok(self.connection_server.bind(addr).await?)
    }

    /// Accepts connections until `cancel` fires or [`Self::stop`] is called.
    pub async fn listen(
        &self,
        listener: TcpListener,
        cancel: Option<duplex_rpc_core::trigger::Listener>,
    ) -> Result<()> {
        Ok(self.connection_server.listen(listener, cancel).await?)
    }

    pub fn stop(&self) -> Result<()> {
        Ok(self.connection_server.stop()?)
    }

    pub async fn join(&self) -> Result<()> {
        Ok(self.connection_server.join().await?)
    }

    pub async fn stop_and_join(&self) -> Result<()> {
        Ok(self.connection_server.stop_and_join().await?)
    }
}
