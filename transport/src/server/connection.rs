//!
//! [`Connection`] owns one accepted WebSocket: the outbound send queue (an
//! unbounded mpsc channel drained by a single task so frames are never
//! interleaved) and the `receive`/`error`/`close` subscriber lists consumed
//! by binders layered on top in the `duplex-rpc` crate.
//!
use futures_util::stream::{SplitSink, SplitStream};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender as TokioUnboundedSender;
use tokio_tungstenite::WebSocketStream;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
pub use tungstenite::Message;

use super::Error;

pub type WebSocketSender = SplitSink<WebSocketStream<TcpStream>, Message>;
pub type WebSocketReceiver = SplitStream<WebSocketStream<TcpStream>>;
pub type WebSocketSink = TokioUnboundedSender<Message>;

/// Default maximum text/binary frame size, enforced symmetrically on send
/// and receive.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 65_536;

type ReceiveHandler = Arc<dyn Fn(Vec<u8>, bool) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;
type CloseHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    receive: Vec<ReceiveHandler>,
    error: Vec<ErrorHandler>,
    close: Vec<CloseHandler>,
}

/// Reason a connection was closed, mapped to the corresponding WebSocket
/// close status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStatus {
    Normal,
    MessageTooBig,
    InternalServerError,
}

impl CloseStatus {
    fn code(self) -> CloseCode {
        match self {
            CloseStatus::Normal => CloseCode::Normal,
            CloseStatus::MessageTooBig => CloseCode::Size,
            CloseStatus::InternalServerError => CloseCode::Error,
        }
    }
}

pub struct Connection {
    peer: SocketAddr,
    cookies: Arc<HashMap<String, String>>,
    sink: WebSocketSink,
    max_message_size: usize,
    open: AtomicBool,
    subscribers: Mutex<Subscribers>,
}

impl Connection {
    pub(crate) fn new(
        peer: SocketAddr,
        cookies: HashMap<String, String>,
        sink: WebSocketSink,
        max_message_size: usize,
    ) -> Arc<Self> {
        Arc::new(Connection {
            peer,
            cookies: Arc::new(cookies),
            sink,
            max_message_size,
            open: AtomicBool::new(true),
            subscribers: Mutex::new(Subscribers::default()),
        })
    }

    pub fn peer(&self) -> &SocketAddr {
        &self.peer
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Subscribe to incoming frames. `is_text` distinguishes text from
    /// binary frames.
    pub fn on_receive<F>(&self, f: F)
    where
        F: Fn(Vec<u8>, bool) + Send + Sync + 'static,
    {
        self.subscribers.lock().unwrap().receive.push(Arc::new(f));
    }

    pub fn on_error<F>(&self, f: F)
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.subscribers.lock().unwrap().error.push(Arc::new(f));
    }

    /// Subscribe to the close event. Fires exactly once, after the last
    /// receive or error notification.
    pub fn on_close<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribers.lock().unwrap().close.push(Arc::new(f));
    }

    pub(crate) fn notify_receive(&self, data: Vec<u8>, is_text: bool) {
        let handlers = self.subscribers.lock().unwrap().receive.clone();
        for cb in handlers.iter() {
            cb(data.clone(), is_text);
        }
    }

    pub(crate) fn notify_error(&self, err: &Error) {
        let handlers = self.subscribers.lock().unwrap().error.clone();
        for cb in handlers.iter() {
            cb(err);
        }
    }

    /// Fires `close` exactly once, then clears every subscriber list so
    /// late-arriving events are never delivered again.
    pub(crate) fn notify_close_once(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let handlers = {
                let mut subs = self.subscribers.lock().unwrap();
                subs.receive.clear();
                subs.error.clear();
                std::mem::take(&mut subs.close)
            };
            for cb in handlers.iter() {
                cb();
            }
        }
    }

    /// Encodes `data` as a text frame and enqueues it on the send queue.
    /// Returns `Ok(false)` without enqueuing if the connection is not open.
    /// Refuses and closes the connection with [`CloseStatus::MessageTooBig`]
    /// if the encoded length reaches `max_message_size`.
    pub fn send_text(&self, data: String) -> bool {
        if !self.is_open() {
            return false;
        }
        if data.len() >= self.max_message_size {
            self.close(CloseStatus::MessageTooBig, "message too big".to_string());
            return false;
        }
        self.sink.send(Message::Text(data)).is_ok()
    }

    /// Initiates an outbound close with the given status if the connection
    /// is still open. Any failure to hand the close frame to the socket is
    /// swallowed; the local close notification always fires.
    pub fn close(&self, status: CloseStatus, reason: String) {
        if self.is_open() {
            let frame = CloseFrame {
                code: status.code(),
                reason: reason.into(),
            };
            let _ = self.sink.send(Message::Close(Some(frame)));
        }
        self.notify_close_once();
    }
}
