//!
//! [`LocalBinder`] dispatches incoming requests against a method table built
//! for one bound object. See [`LocalBinderBuilder`] for constructing one.
//!
use std::any::Any;

use crate::envelope::{self, CallId, ResponseEnvelope};
use crate::imports::*;
use crate::server::method::Method;
use crate::server::registry::BinderRegistry;
use duplex_rpc_transport::server::Connection;

/// Registered per `(connection, target object)`. Subscribes to the
/// connection's `receive` notification and resolves each incoming request to
/// a method in its table.
pub struct LocalBinder {
    connection: Arc<Connection>,
    object: Arc<dyn Any + Send + Sync>,
    methods: AHashMap<String, Method>,
}

impl LocalBinder {
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn object(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.object
    }

    /// Parses `text` as a request; ignores it if empty (not a request, or a
    /// response meant for a [`RemoteBinder`](super::RemoteBinder)).
    async fn dispatch(self: Arc<Self>, text: String) {
        let request = match envelope::parse_request(&text) {
            Ok(request) if request.function_name.is_some() => request,
            _ => return,
        };

        let call_id = request.call_id.clone();
        let method = match self.methods.get(request.function_name()) {
            Some(method) => method,
            None => {
                let err = ServerError::NotFound(request.function_name().to_string());
                self.respond(call_id, Err(err.to_string()));
                return;
            }
        };

        let result = method
            .call(request.arguments().to_vec())
            .await
            .map_err(|err| err.to_string());
        self.respond(call_id, result);
    }

    fn respond(&self, call_id: CallId, result: Result<Value, String>) {
        let response = match result {
            Ok(value) => ResponseEnvelope::success(call_id, value),
            Err(message) => ResponseEnvelope::failure(Some(call_id), message),
        };
        match serde_json::to_string(&response) {
            Ok(text) => {
                self.connection.send_text(text);
            }
            Err(err) => log_error!("local binder: failed to serialize response: {}", err),
        }
    }
}

/// Builds a [`LocalBinder`]'s method table. Panics on a duplicate method
/// name: per the binder contract, overloads are unsupported and a duplicate
/// registration is a construction-time failure, not a runtime one.
#[derive(Default)]
pub struct LocalBinderBuilder {
    methods: AHashMap<String, Method>,
}

impl LocalBinderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, name: &str, method: Method) -> Self {
        if self.methods.insert(name.to_string(), method).is_some() {
            panic!("{}", ServerError::Duplicate(name.to_string()));
        }
        self
    }

    /// Binds the accumulated method table to `connection` for dispatch
    /// against `object`, subscribes to the connection's `receive`
    /// notification, and registers the binder in `registry`.
    pub fn build(
        self,
        connection: Arc<Connection>,
        object: Arc<dyn Any + Send + Sync>,
        registry: &BinderRegistry,
    ) -> Arc<LocalBinder> {
        let binder = Arc::new(LocalBinder {
            connection: connection.clone(),
            object,
            methods: self.methods,
        });

        let dispatch_binder = binder.clone();
        connection.on_receive(move |data, is_text| {
            if !is_text {
                return;
            }
            let Ok(text) = String::from_utf8(data) else {
                return;
            };
            if !envelope::is_rpc_message(&text) {
                return;
            }
            let dispatch_binder = dispatch_binder.clone();
            duplex_rpc_core::task::spawn(async move {
                dispatch_binder.dispatch(text).await;
            });
        });

        registry.register_local(binder.clone());
        binder
    }
}
