//! In-memory transport for tests.
//!
//! # Why a mock transport?
//!
//! The real [`WebSocketTransport`](super::WebSocketTransport) needs a running
//! server.  [`MockTransportFactory`] replaces the socket with a channel so a
//! test can script exactly what the "server" pushes, and inspect exactly what
//! the client wrote and when it closed the connection.
//!
//! # Usage in tests
//!
//! ```ignore
//! let (factory, handle) = MockTransportFactory::new();
//! let mut session = Session::new(Identity::parse("bobby")?);
//! session.open(Arc::new(factory)).await;
//!
//! handle.push_text(r#"{"username":"alice","message":"alice: hi"}"#);
//! let frame = session.next_frame().await;
//!
//! assert_eq!(handle.sent_frames()[0], r#"{"type":"join","username":"bobby"}"#);
//! ```
//!
//! Payloads pushed before the first `open` are queued and delivered to the
//! next transport that is opened.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::session::{Incoming, Transport, TransportError, TransportFactory};

/// One scripted server-side event.
enum Scripted {
    Deliver(Result<Incoming, TransportError>),
    HangUp,
}

#[derive(Default)]
struct Shared {
    sent: Vec<String>,
    open_count: usize,
    close_count: usize,
    current_closed: bool,
    fail_next_open: bool,
    fail_sends: bool,
    pending: Vec<Scripted>,
    inbound: Option<mpsc::UnboundedSender<Scripted>>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A panicking test thread must not hide the state from the others.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opens [`MockTransport`]s that all report to one [`MockTransportHandle`].
#[derive(Clone)]
pub struct MockTransportFactory {
    shared: Arc<Mutex<Shared>>,
}

/// Test-side controls for the transports opened by a [`MockTransportFactory`].
#[derive(Clone)]
pub struct MockTransportHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockTransportFactory {
    /// Creates a factory and the handle that scripts and observes it.
    pub fn new() -> (Self, MockTransportHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockTransportHandle { shared },
        )
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        let mut shared = lock(&self.shared);
        shared.open_count += 1;

        if shared.fail_next_open {
            shared.fail_next_open = false;
            return Err(TransportError::Open {
                endpoint: "mock://chat".to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        for item in shared.pending.drain(..) {
            let _ = tx.send(item);
        }
        shared.inbound = Some(tx);
        shared.current_closed = false;

        Ok(Box::new(MockTransport {
            generation: shared.open_count,
            shared: Arc::clone(&self.shared),
            inbound: rx,
        }))
    }
}

impl MockTransportHandle {
    fn script(&self, item: Scripted) {
        let mut shared = lock(&self.shared);
        match shared.inbound.as_ref() {
            Some(tx) => {
                let _ = tx.send(item);
            }
            None => shared.pending.push(item),
        }
    }

    /// Queues a text payload from the server.
    pub fn push_text(&self, text: impl Into<String>) {
        self.script(Scripted::Deliver(Ok(Incoming::Text(text.into()))));
    }

    /// Queues a payload that cannot be read as text.
    pub fn push_binary(&self) {
        self.script(Scripted::Deliver(Ok(Incoming::Unreadable(
            "binary frame".to_string(),
        ))));
    }

    /// Queues a receive error.
    pub fn push_error(&self, reason: &str) {
        self.script(Scripted::Deliver(Err(TransportError::Receive(
            reason.to_string(),
        ))));
    }

    /// Queues a server-initiated close.
    pub fn hang_up(&self) {
        self.script(Scripted::HangUp);
    }

    /// Makes the next `open` fail.
    pub fn fail_next_open(&self) {
        lock(&self.shared).fail_next_open = true;
    }

    /// Makes every subsequent `send_text` fail.
    pub fn fail_sends(&self) {
        lock(&self.shared).fail_sends = true;
    }

    /// Every frame written so far, across all opened transports, in order.
    pub fn sent_frames(&self) -> Vec<String> {
        lock(&self.shared).sent.clone()
    }

    pub fn open_count(&self) -> usize {
        lock(&self.shared).open_count
    }

    pub fn close_count(&self) -> usize {
        lock(&self.shared).close_count
    }

    /// `true` once the most recently opened transport has been closed.
    pub fn is_closed(&self) -> bool {
        lock(&self.shared).current_closed
    }
}

/// A transport backed by an in-memory channel.
pub struct MockTransport {
    generation: usize,
    shared: Arc<Mutex<Shared>>,
    inbound: mpsc::UnboundedReceiver<Scripted>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let mut shared = lock(&self.shared);
        if shared.fail_sends {
            return Err(TransportError::Send("broken pipe".to_string()));
        }
        shared.sent.push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Incoming, TransportError>> {
        // `UnboundedReceiver::recv` is cancel-safe.
        match self.inbound.recv().await? {
            Scripted::Deliver(item) => Some(item),
            Scripted::HangUp => None,
        }
    }

    async fn close(&mut self) {
        let mut shared = lock(&self.shared);
        shared.close_count += 1;
        if shared.open_count == self.generation {
            shared.current_closed = true;
            shared.inbound = None;
        }
        self.inbound.close();
    }
}
