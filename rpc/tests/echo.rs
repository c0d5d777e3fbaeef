//! End-to-end tests driving a real [`RpcServer`] over a loopback TCP
//! connection, using a raw `tokio-tungstenite` client as the remote peer.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tungstenite::Message;

use duplex_rpc::server::{method, LocalBinderBuilder, RpcServer};

async fn spawn_echo_server() -> (Arc<RpcServer>, SocketAddr) {
    let server = RpcServer::new(
        |connection, registry| {
            let builder = LocalBinderBuilder::new()
                .method(
                    "echo",
                    method!(|value: String| async move { Ok(value) }),
                )
                .method(
                    "add",
                    method!(|a: i64, b: i64| async move { Ok(a + b) }),
                )
                .method(
                    "userInfo",
                    method!(|| async move {
                        Ok(json!({ "UserName": "Bob", "UserID": 7 }))
                    }),
                );
            builder.build(connection, Arc::new(()), &registry);
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
    (server, addr)
}

async fn connect(addr: SocketAddr) -> tokio_tungstenite::WebSocketStream<tokio::net::TcpStream> {
    let url = format!("ws://{addr}/");
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn echo_round_trip() {
    let (_server, addr) = spawn_echo_server().await;
    let stream = connect(addr).await;
    let (mut write, mut read) = stream.split();

    write
        .send(Message::Text(
            r#"{"functionName":"echo","arguments":["hello"],"callId":"1"}"#.to_string(),
        ))
        .await
        .unwrap();

    let response = read.next().await.unwrap().unwrap();
    let value: Value = serde_json::from_str(&response.into_text().unwrap()).unwrap();
    assert_eq!(value["callId"], "1");
    assert_eq!(value["returnValue"], "hello");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn positional_arguments_match_by_index() {
    let (_server, addr) = spawn_echo_server().await;
    let stream = connect(addr).await;
    let (mut write, mut read) = stream.split();

    write
        .send(Message::Text(
            r#"{"functionName":"add","arguments":[2,3],"callId":"9"}"#.to_string(),
        ))
        .await
        .unwrap();

    let response = read.next().await.unwrap().unwrap();
    let value: Value = serde_json::from_str(&response.into_text().unwrap()).unwrap();
    assert_eq!(value["returnValue"], 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_method_reports_error() {
    let (_server, addr) = spawn_echo_server().await;
    let stream = connect(addr).await;
    let (mut write, mut read) = stream.split();

    write
        .send(Message::Text(
            r#"{"functionName":"missing","arguments":[],"callId":"2"}"#.to_string(),
        ))
        .await
        .unwrap();

    let response = read.next().await.unwrap().unwrap();
    let value: Value = serde_json::from_str(&response.into_text().unwrap()).unwrap();
    assert_eq!(value["callId"], "2");
    assert!(value["error"]
        .as_str()
        .unwrap()
        .contains("method not found: missing"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn oversize_frame_closes_the_connection() {
    let (_server, addr) = spawn_echo_server().await;
    let stream = connect(addr).await;
    let (mut write, mut read) = stream.split();

    // exactly maxMessageSize (65536) bytes; a JSON string this large is not a
    // valid envelope, but the size check runs before any parsing happens.
    let oversized = "x".repeat(65_536);
    write.send(Message::Text(oversized)).await.unwrap();

    match read.next().await {
        Some(Ok(Message::Close(_))) | None => {}
        other => panic!("expected the connection to close, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn map_values_preserve_key_casing() {
    let (_server, addr) = spawn_echo_server().await;
    let stream = connect(addr).await;
    let (mut write, mut read) = stream.split();

    write
        .send(Message::Text(
            r#"{"functionName":"userInfo","arguments":[],"callId":"3"}"#.to_string(),
        ))
        .await
        .unwrap();

    let response = read.next().await.unwrap().unwrap();
    let text = response.into_text().unwrap();
    assert!(text.contains(r#""UserName":"Bob""#));
    assert!(text.contains(r#""UserID":7"#));
}
