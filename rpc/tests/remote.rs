//! Tests driving [`RemoteBinder`] against a raw `tokio-tungstenite` peer
//! standing in for the remote side of the connection.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tungstenite::Message;

use duplex_rpc::error::ServerError;
use duplex_rpc::server::{call_many, BinderRegistry, LocalBinderBuilder, RemoteBinder, RpcServer};

/// Marker type identifying "the interface the other peer implements" for
/// this test; `RemoteBinder<Peer>` carries no runtime data for `Peer`, it
/// only disambiguates binders of different interfaces in the registry.
struct Peer;

async fn spawn_remote_binder_server(
    termination_delay: Duration,
) -> (Arc<RpcServer>, SocketAddr, Arc<Mutex<Vec<Arc<RemoteBinder<Peer>>>>>) {
    let binders = Arc::new(Mutex::new(Vec::new()));
    let binders_for_callback = binders.clone();

    let server = RpcServer::new(
        move |connection, registry| {
            let binder = RemoteBinder::<Peer>::new(connection, termination_delay, &registry);
            binders_for_callback.lock().unwrap().push(binder);
        },
        None,
        None,
    );

    let listener: TcpListener = server.bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_clone = server.clone();
    tokio::spawn(async move {
        let _ = server_clone.listen(listener, None).await;
    });
    (server, addr, binders)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn call_resolves_from_peer_response() {
    let (_server, addr, binders) = spawn_remote_binder_server(Duration::from_secs(5)).await;

    let url = format!("ws://{addr}/");
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    let (mut write, mut read) = stream.split();

    // wait until the server side has installed its RemoteBinder
    let binder = loop {
        if let Some(binder) = binders.lock().unwrap().first().cloned() {
            break binder;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    let call = tokio::spawn(async move { binder.call("double", vec![Value::from(21)]).await });

    let request = read.next().await.unwrap().unwrap();
    let request: Value = serde_json::from_str(&request.into_text().unwrap()).unwrap();
    assert_eq!(request["functionName"], "double");
    let call_id = request["callId"].clone();

    let response = serde_json::json!({ "callId": call_id, "returnValue": 42 });
    write
        .send(Message::Text(response.to_string()))
        .await
        .unwrap();

    let result = call.await.unwrap();
    assert_eq!(result.unwrap(), Value::from(42));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn call_times_out_when_peer_stays_silent() {
    let (_server, addr, binders) = spawn_remote_binder_server(Duration::from_millis(80)).await;

    let url = format!("ws://{addr}/");
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    // hold the stream open without ever answering.
    let (_write, _read) = stream.split();

    let binder = loop {
        if let Some(binder) = binders.lock().unwrap().first().cloned() {
            break binder;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    let result = binder.call("slow", vec![]).await;
    assert!(matches!(result, Err(ServerError::Cancelled)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closed_connection_fails_pending_calls() {
    let (_server, addr, binders) = spawn_remote_binder_server(Duration::from_secs(30)).await;

    let url = format!("ws://{addr}/");
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    let binder = loop {
        if let Some(binder) = binders.lock().unwrap().first().cloned() {
            break binder;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    let call = tokio::spawn({
        let binder = binder.clone();
        async move { binder.call("never_answers", vec![]).await }
    });

    // give the request a moment to actually go out, then drop the client
    // connection out from under it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(stream);

    let result = call.await.unwrap();
    assert!(matches!(result, Err(ServerError::Close)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broadcast_reaches_every_connection_sharing_the_object() {
    // Two connections bind a local binder for the *same* shared object;
    // a third binds a local binder for a distinct object. remote_of_type_for
    // should only surface remote binders for the two that share `shared`.
    let shared = Arc::new(());
    let other = Arc::new(());

    let shared_for_cb = shared.clone();
    let other_for_cb = other.clone();
    let registry_holder: Arc<Mutex<Option<Arc<BinderRegistry>>>> = Arc::new(Mutex::new(None));
    let registry_holder_cb = registry_holder.clone();

    let connection_count = Arc::new(Mutex::new(0usize));
    let connection_count_cb = connection_count.clone();

    let server = RpcServer::new(
        move |connection, registry| {
            *registry_holder_cb.lock().unwrap() = Some(registry.clone());
            let mut count = connection_count_cb.lock().unwrap();
            *count += 1;
            let object: Arc<dyn std::any::Any + Send + Sync> = if *count <= 2 {
                shared_for_cb.clone()
            } else {
                other_for_cb.clone()
            };
            let builder = LocalBinderBuilder::new();
            builder.build(connection.clone(), object, &registry);
            RemoteBinder::<Peer>::new(connection, Duration::from_secs(5), &registry);
        },
        None,
        None,
    );

    let listener: TcpListener = server.bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_clone = server.clone();
    tokio::spawn(async move {
        let _ = server_clone.listen(listener, None).await;
    });

    let url = format!("ws://{addr}/");
    let mut peers = Vec::new();
    for _ in 0..3 {
        let (stream, _) = tokio_tungstenite::connect_async(url.clone()).await.unwrap();
        peers.push(stream);
    }

    tokio::time::sleep(Duration::from_millis(50)).await;

    let registry = registry_holder.lock().unwrap().clone().unwrap();
    let matching = registry.remote_of_type_for::<Peer, ()>(&shared);
    assert_eq!(matching.len(), 2);

    let all_peer_binders = registry.remote_of_type::<Peer>();
    assert_eq!(all_peer_binders.len(), 3);

    let _ = call_many(&matching, |binder| async move {
        binder.call("ping", vec![]).await
    })
    .await;

    drop(peers);
}
