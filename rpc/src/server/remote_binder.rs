//!
//! [`RemoteBinder`] issues calls against methods bound on the remote peer and
//! resolves them as response envelopes arrive, or times them out after a
//! configurable termination delay.
//!
use std::marker::PhantomData;
use std::time::Duration;

use crate::envelope::{self, CallId, RequestEnvelope};
use crate::imports::*;
use crate::server::registry::BinderRegistry;
use duplex_rpc_core::channel::oneshot;
use duplex_rpc_transport::server::Connection;

/// Default wait for a response before a call fails with
/// [`ServerError::Cancelled`]; `Duration::ZERO` disables the timeout.
pub const DEFAULT_TERMINATION_DELAY: Duration = Duration::from_secs(30);

type Waiter = duplex_rpc_core::channel::Sender<ServerResult<Value>>;

/// Registered per `(connection, interface)`. `I` is a zero-sized marker type
/// identifying the interface so a [`BinderRegistry`] can look up "every
/// remote binder of interface `I`" without the caller downcasting by hand.
pub struct RemoteBinder<I> {
    connection: Arc<Connection>,
    termination_delay: Duration,
    pending: Mutex<AHashMap<CallId, Waiter>>,
    _interface: PhantomData<I>,
}

impl<I: Send + Sync + 'static> RemoteBinder<I> {
    /// Subscribes to the connection's `receive` notification to intercept
    /// responses and to `close` to fail every pending call, then registers
    /// the binder in `registry`.
    pub fn new(
        connection: Arc<Connection>,
        termination_delay: Duration,
        registry: &BinderRegistry,
    ) -> Arc<Self> {
        let binder = Arc::new(RemoteBinder {
            connection: connection.clone(),
            termination_delay,
            pending: Mutex::new(AHashMap::new()),
            _interface: PhantomData,
        });

        let receive_binder = binder.clone();
        connection.on_receive(move |data, is_text| {
            if !is_text {
                return;
            }
            let Ok(text) = std::str::from_utf8(&data) else {
                return;
            };
            if let Ok(response) = envelope::parse_response(text) {
                if response.call_id.is_some() {
                    receive_binder.handle_response(response);
                }
            }
        });

        let close_binder = binder.clone();
        connection.on_close(move || {
            close_binder.fail_all_pending();
        });

        registry.register_remote(binder.clone());
        binder
    }

    pub fn connection(&self) -> Arc<Connection> {
        self.connection.clone()
    }

    /// Invokes `function_name` with positional `arguments`, returning the
    /// decoded `returnValue` on success.
    pub async fn call(&self, function_name: &str, arguments: Vec<Value>) -> ServerResult<Value> {
        let call_id = CallId::generate();
        let (tx, rx) = oneshot::<ServerResult<Value>>();
        self.pending.lock().unwrap().insert(call_id.clone(), tx);

        let request = RequestEnvelope::new(function_name.to_string(), arguments, call_id.clone());
        let text = serde_json::to_string(&request).map_err(|_| ServerError::RespSerialize)?;

        if !self.connection.send_text(text) {
            self.pending.lock().unwrap().remove(&call_id);
            return Err(ServerError::SendFailure("connection is not open".to_string()));
        }

        if self.termination_delay.is_zero() {
            return rx.recv().await.map_err(|_| ServerError::Close)?;
        }

        tokio::select! {
            result = rx.recv() => result.map_err(|_| ServerError::Close)?,
            _ = tokio::time::sleep(self.termination_delay) => {
                if self.pending.lock().unwrap().remove(&call_id).is_some() {
                    Err(ServerError::Cancelled)
                } else {
                    // the response handler already claimed this call id; it
                    // holds the only sender so the channel will resolve.
                    rx.recv().await.map_err(|_| ServerError::Close)?
                }
            }
        }
    }

    /// Convenience wrapper decoding the returned value into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        function_name: &str,
        arguments: Vec<Value>,
    ) -> ServerResult<T> {
        let value = self.call(function_name, arguments).await?;
        serde_json::from_value(value).map_err(|err| ServerError::Decode(err.to_string()))
    }

    fn handle_response(&self, response: crate::envelope::ResponseEnvelope) {
        let Some(call_id) = response.call_id else {
            return;
        };
        let sender = self.pending.lock().unwrap().remove(&call_id);
        let Some(sender) = sender else {
            // late reply after timeout or close; dropped silently.
            return;
        };
        let result = match response.error {
            Some(message) => Err(ServerError::Remote(message)),
            None => Ok(response.return_value.unwrap_or(Value::Null)),
        };
        let _ = sender.try_send(result);
    }

    fn fail_all_pending(&self) {
        let pending = std::mem::take(&mut *self.pending.lock().unwrap());
        for (_, sender) in pending {
            let _ = sender.try_send(Err(ServerError::Close));
        }
    }
}
