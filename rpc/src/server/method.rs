//! Module containing the [`Method`] closure wrapper used by [`LocalBinder`](super::LocalBinder).
use crate::imports::*;

/// Method closure function type: takes the request's positional argument
/// array and returns a JSON-encoded result.
pub type MethodFn =
    Arc<dyn Send + Sync + Fn(Vec<Value>) -> MethodFnReturn + 'static>;

pub type MethodFnReturn = Pin<Box<dyn Send + 'static + Future<Output = ServerResult<Value>>>>;

/// Wraps a method handler closure so it can be stored in the method table
/// without generics over its argument or return types. Handlers generated by
/// the [`method!`](crate::server::method) macro decode their positional
/// arguments before invoking the typed body and re-encode its result.
pub struct Method {
    method: MethodFn,
}

impl Method {
    pub fn new<FN>(method_fn: FN) -> Method
    where
        FN: Send + Sync + Fn(Vec<Value>) -> MethodFnReturn + 'static,
    {
        Method {
            method: Arc::new(method_fn),
        }
    }

    pub async fn call(&self, arguments: Vec<Value>) -> ServerResult<Value> {
        (self.method)(arguments).await
    }
}
