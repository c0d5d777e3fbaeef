//!
//! [`BinderRegistry`] is a process-wide collection of every connection's
//! binders, supporting lookup by connection and by interface type. This
//! backs the "broadcast a call to every peer that has observed object O"
//! pattern described for [`RemoteBinder`].
//!
use std::any::Any;

use downcast_rs::{impl_downcast, DowncastSync};

use crate::imports::*;
use crate::server::local_binder::LocalBinder;
use crate::server::remote_binder::RemoteBinder;
use duplex_rpc_transport::server::Connection;

/// Implemented by every `RemoteBinder<I>`, erasing the interface type `I` so
/// binders over different interfaces can share one registry.
pub trait RemoteBinderAny: DowncastSync {
    fn connection(&self) -> Arc<Connection>;
}
impl_downcast!(sync RemoteBinderAny);

impl<I: Send + Sync + 'static> RemoteBinderAny for RemoteBinder<I> {
    fn connection(&self) -> Arc<Connection> {
        RemoteBinder::connection(self)
    }
}

/// Either kind of binder, as returned by [`BinderRegistry::all_for_connection`].
pub enum Binder {
    Local(Arc<LocalBinder>),
    Remote(Arc<dyn RemoteBinderAny>),
}

/// A process-wide (or server-scoped, if the application keeps its own
/// instance rather than a shared global) collection of binders.
#[derive(Default)]
pub struct BinderRegistry {
    locals: Mutex<Vec<Arc<LocalBinder>>>,
    remotes: Mutex<Vec<Arc<dyn RemoteBinderAny>>>,
}

impl BinderRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(BinderRegistry::default())
    }

    pub(crate) fn register_local(&self, binder: Arc<LocalBinder>) {
        self.locals.lock().unwrap().push(binder);
    }

    pub(crate) fn register_remote(&self, binder: Arc<dyn RemoteBinderAny>) {
        self.remotes.lock().unwrap().push(binder);
    }

    /// Drops every binder whose connection has closed. The registry is
    /// append-only otherwise; call this periodically (or from a server's
    /// connection-close hook) to bound its memory.
    pub fn reap_closed(&self) {
        self.locals.lock().unwrap().retain(|b| b.connection().is_open());
        self.remotes.lock().unwrap().retain(|b| b.connection().is_open());
    }

    /// Snapshot of every binder bound to `connection`. Safe against
    /// concurrent registration elsewhere: the lists are cloned under lock,
    /// then filtered.
    pub fn all_for_connection(&self, connection: &Arc<Connection>) -> Vec<Binder> {
        let locals = self.locals.lock().unwrap().clone();
        let remotes = self.remotes.lock().unwrap().clone();
        locals
            .into_iter()
            .filter(|b| Arc::ptr_eq(b.connection(), connection))
            .map(Binder::Local)
            .chain(
                remotes
                    .into_iter()
                    .filter(|b| Arc::ptr_eq(&b.connection(), connection))
                    .map(Binder::Remote),
            )
            .collect()
    }

    /// Every remote binder over interface `I`, across every connection.
    pub fn remote_of_type<I: Send + Sync + 'static>(&self) -> Vec<Arc<RemoteBinder<I>>> {
        self.remotes
            .lock()
            .unwrap()
            .iter()
            .filter_map(|b| b.clone().downcast_arc::<RemoteBinder<I>>().ok())
            .collect()
    }

    /// Every remote binder of interface `I` whose connection also carries a
    /// local binder for `object` (identity comparison, not equality).
    pub fn remote_of_type_for<I, T>(&self, object: &Arc<T>) -> Vec<Arc<RemoteBinder<I>>>
    where
        I: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let object: Arc<dyn Any + Send + Sync> = object.clone();
        let connections: Vec<Arc<Connection>> = self
            .locals
            .lock()
            .unwrap()
            .iter()
            .filter(|b| Arc::ptr_eq(b.object(), &object))
            .map(|b| b.connection().clone())
            .collect();

        self.remotes
            .lock()
            .unwrap()
            .iter()
            .filter(|b| connections.iter().any(|c| Arc::ptr_eq(c, &b.connection())))
            .filter_map(|b| b.clone().downcast_arc::<RemoteBinder<I>>().ok())
            .collect()
    }
}

/// Invokes `selector` across every binder in `binders` concurrently and
/// returns only the results of calls that succeeded; a failed or cancelled
/// call is dropped silently rather than propagated.
pub async fn call_many<I, T, F, Fut>(binders: &[Arc<RemoteBinder<I>>], selector: F) -> Vec<T>
where
    I: Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(Arc<RemoteBinder<I>>) -> Fut,
    Fut: Future<Output = ServerResult<T>>,
{
    let calls = binders.iter().cloned().map(selector);
    futures::future::join_all(calls)
        .await
        .into_iter()
        .filter_map(|result| result.ok())
        .collect()
}

/// As [`call_many`], but for calls with no meaningful return value; simply
/// awaits all of them.
pub async fn call_many_void<I, F, Fut>(binders: &[Arc<RemoteBinder<I>>], selector: F)
where
    I: Send + Sync + 'static,
    F: Fn(Arc<RemoteBinder<I>>) -> Fut,
    Fut: Future<Output = ServerResult<()>>,
{
    let calls = binders.iter().cloned().map(selector);
    let _ = futures::future::join_all(calls).await;
}
