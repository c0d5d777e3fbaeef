//!
//! async WebSocket server functionality (requires tokio executor)
//!
use futures::{future::FutureExt, select};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
pub use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::{accept_hdr_async_with_config, WebSocketStream};
use tungstenite::Error as WebSocketError;
use duplex_rpc_core::channel::DuplexChannel;
use duplex_rpc_log::*;

pub mod connection;
pub mod error;
pub mod result;

pub use connection::{
    CloseStatus, Connection, WebSocketReceiver, WebSocketSender, WebSocketSink,
    DEFAULT_MAX_MESSAGE_SIZE,
};
pub use error::Error;
pub use result::Result;
pub use tungstenite::protocol::WebSocketConfig;
pub use tungstenite::Message;

/// Atomic counters tracking connection counts and cumulative message sizes
/// in bytes (bandwidth consumption without websocket framing overhead).
pub struct ConnectionCounters {
    pub total_connections: Arc<AtomicUsize>,
    pub active_connections: Arc<AtomicUsize>,
    pub handshake_failures: Arc<AtomicUsize>,
    pub rx_bytes: Arc<AtomicUsize>,
    pub tx_bytes: Arc<AtomicUsize>,
}

impl Default for ConnectionCounters {
    fn default() -> Self {
        ConnectionCounters {
            total_connections: Arc::new(AtomicUsize::new(0)),
            active_connections: Arc::new(AtomicUsize::new(0)),
            handshake_failures: Arc::new(AtomicUsize::new(0)),
            rx_bytes: Arc::new(AtomicUsize::new(0)),
            tx_bytes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Callback invoked synchronously once a [`Connection`] is constructed,
/// before the receive loop starts delivering traffic. Application code
/// installs its binders here.
pub type OnConnect = Arc<dyn Fn(Arc<Connection>) + Send + Sync>;

/// Accepts inbound WebSocket upgrades and drives each connection's
/// full-duplex message pump.
pub struct ConnectionServer {
    pub counters: Arc<ConnectionCounters>,
    pub max_message_size: usize,
    on_connect: OnConnect,
    stop: DuplexChannel,
    connections: Mutex<Vec<Weak<Connection>>>,
}

impl ConnectionServer {
    pub fn new(on_connect: OnConnect, counters: Option<Arc<ConnectionCounters>>) -> Arc<Self> {
        Arc::new(ConnectionServer {
            counters: counters.unwrap_or_default(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            on_connect,
            stop: DuplexChannel::oneshot(),
            connections: Mutex::new(Vec::new()),
        })
    }

    /// Closes every connection still tracked as live. Called on shutdown so
    /// a triggered cancellation (or explicit `stop()`) doesn't leave
    /// established connections' remote binders parked forever.
    fn close_all_connections(&self) {
        let live: Vec<Arc<Connection>> = self
            .connections
            .lock()
            .unwrap()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for connection in live {
            connection.close(CloseStatus::Normal, "server shutting down".to_string());
        }
    }

    pub fn with_max_message_size(mut self: Arc<Self>, max_message_size: usize) -> Arc<Self> {
        Arc::get_mut(&mut self)
            .expect("with_max_message_size must be called before the server is shared")
            .max_message_size = max_message_size;
        self
    }

    async fn handle_connection(self: &Arc<Self>, peer: SocketAddr, stream: TcpStream) -> Result<()> {
        let cookies = Arc::new(std::sync::Mutex::new(HashMap::new()));
        let cookies_for_callback = cookies.clone();
        let callback = move |req: &Request, resp: Response| {
            if let Some(header) = req.headers().get("cookie") {
                if let Ok(text) = header.to_str() {
                    *cookies_for_callback.lock().unwrap() = parse_cookies(text);
                }
            }
            Ok(resp)
        };

        let ws_stream: WebSocketStream<TcpStream> =
            accept_hdr_async_with_config(stream, callback, None).await?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (sink_sender, mut sink_receiver) = tokio::sync::mpsc::unbounded_channel::<Message>();

        let cookies = Arc::try_unwrap(cookies)
            .map(|m| m.into_inner().unwrap())
            .unwrap_or_default();
        let connection = Connection::new(peer, cookies, sink_sender, self.max_message_size);
        self.connections
            .lock()
            .unwrap()
            .push(Arc::downgrade(&connection));

        (self.on_connect)(connection.clone());

        let result = loop {
            select! {
                msg = sink_receiver.recv().fuse() => {
                    match msg {
                        Some(Message::Close(frame)) => {
                            let _ = ws_sender.send(Message::Close(frame)).await;
                            break Ok(());
                        }
                        Some(msg) => {
                            let len = match &msg {
                                Message::Text(t) => t.len(),
                                Message::Binary(b) => b.len(),
                                _ => 0,
                            };
                            self.counters.tx_bytes.fetch_add(len, Ordering::Relaxed);
                            if let Err(err) = ws_sender.send(msg).await {
                                break Err(Error::WebSocketError(err));
                            }
                        }
                        None => break Ok(()),
                    }
                }
                msg = ws_receiver.next().fuse() => {
                    match msg {
                        Some(Ok(Message::Close(_))) => {
                            break Ok(());
                        }
                        Some(Ok(Message::Text(text))) => {
                            self.counters.rx_bytes.fetch_add(text.len(), Ordering::Relaxed);
                            if text.len() >= self.max_message_size {
                                connection.close(CloseStatus::MessageTooBig, "message too big".to_string());
                                break Ok(());
                            }
                            connection.notify_receive(text.into_bytes(), true);
                        }
                        Some(Ok(Message::Binary(data))) => {
                            self.counters.rx_bytes.fetch_add(data.len(), Ordering::Relaxed);
                            if data.len() >= self.max_message_size {
                                connection.close(CloseStatus::MessageTooBig, "message too big".to_string());
                                break Ok(());
                            }
                            connection.notify_receive(data, false);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_sender.send(Message::Pong(data)).await;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            break Err(Error::WebSocketError(err));
                        }
                        None => break Err(Error::AbnormalClose),
                    }
                }
            }
        };

        match &result {
            Ok(()) => connection.close(CloseStatus::Normal, String::new()),
            Err(err) => {
                connection.notify_error(err);
                connection.close(CloseStatus::InternalServerError, err.to_string());
            }
        }

        self.connections.lock().unwrap().retain(|weak| match weak.upgrade() {
            Some(live) => !Arc::ptr_eq(&live, &connection),
            None => false,
        });

        result
    }

    async fn accept(self: &Arc<Self>, stream: TcpStream) {
        let peer = match stream.peer_addr() {
            Ok(peer_address) => peer_address,
            Err(_) => {
                self.counters
                    .handshake_failures
                    .fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        self.counters
            .total_connections
            .fetch_add(1, Ordering::Relaxed);
        self.counters
            .active_connections
            .fetch_add(1, Ordering::Relaxed);

        let self_ = self.clone();
        tokio::spawn(async move {
            if let Err(e) = self_.handle_connection(peer, stream).await {
                match e {
                    Error::WebSocketError(WebSocketError::ConnectionClosed)
                    | Error::WebSocketError(WebSocketError::Protocol(_))
                    | Error::WebSocketError(WebSocketError::Utf8) => (),
                    err => log_error!("Error processing connection: {}", err),
                }
            }
            self_
                .counters
                .active_connections
                .fetch_sub(1, Ordering::Relaxed)
        });
    }

    pub async fn bind(self: &Arc<Self>, addr: &str) -> Result<TcpListener> {
        let listener = TcpListener::bind(&addr).await.map_err(|err| {
            Error::Listen(format!(
                "WebSocket server unable to listen on `{addr}`: {err}",
            ))
        })?;
        Ok(listener)
    }

    /// Accept inbound connections until `cancel` fires or [`Self::stop`] is
    /// called; on return (any reason) every connection still tracked as
    /// live has been asked to close, so their remote binders fail pending
    /// calls with `connection-closed` instead of waiting out their own
    /// termination timer.
    pub async fn listen(
        self: &Arc<Self>,
        listener: TcpListener,
        cancel: Option<duplex_rpc_core::trigger::Listener>,
    ) -> Result<()> {
        let cancel = cancel.unwrap_or_else(|| triggered::trigger().1);
        loop {
            select! {
                stream = listener.accept().fuse() => {
                    if let Ok((stream, _socket_addr)) = stream {
                        self.accept(stream).await;
                    }
                },
                _ = self.stop.request.receiver.recv().fuse() => break,
                _ = cancel.clone().fuse() => break,
            }
        }

        self.close_all_connections();

        self.stop
            .response
            .sender
            .send(())
            .await
            .map_err(|err| Error::Done(err.to_string()))
    }

    pub fn stop(&self) -> Result<()> {
        self.stop
            .request
            .sender
            .try_send(())
            .map_err(|err| Error::Stop(err.to_string()))
    }

    pub async fn join(&self) -> Result<()> {
        self.stop
            .response
            .receiver
            .recv()
            .await
            .map_err(|err| Error::Join(err.to_string()))
    }

    pub async fn stop_and_join(&self) -> Result<()> {
        self.stop()?;
        self.join().await
    }
}

fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();
            if name.is_empty() {
                None
            } else {
                Some((name.to_string(), value.to_string()))
            }
        })
        .collect()
}
