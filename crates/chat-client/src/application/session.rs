//! Session: the lifecycle of one joined participation in the room.
//!
//! ```text
//!           connect()              transport opened,
//!   Idle ─────────────> Connecting ── join frame sent ──> Joined ─┐
//!                           │                              │  ^    │ inbound frames,
//!                           │ open/join failed, close()    │  └────┘ message sends
//!                           v                              v
//!                         Closed <──── peer hangup / error / close()
//! ```
//!
//! `Closed` is terminal: joining again means building a new [`Session`].
//!
//! Opening is split in two so the owner can keep serving other events while
//! the handshake runs.  [`Session::connect`] moves to `Connecting` and hands
//! back an [`OpenFuture`] that borrows nothing from the session;
//! [`Session::finish_connect`] applies its result.  Dropping the future
//! abandons the attempt.
//!
//! The session never reaches the network directly.  It asks an injected
//! [`TransportFactory`] for a [`Transport`], which is a WebSocket in
//! production and an in-memory channel in tests.
//!
//! # Resource release
//!
//! The transport is held in an `Option` and taken out on every path that
//! leaves `Joined`: explicit [`Session::close`], peer hangup, receive error,
//! and send error.  If the session is dropped while still joined, dropping
//! the boxed transport closes the underlying socket.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use chat_core::protocol::codec::{decode_frame, encode_frame};
use chat_core::protocol::frames::{InboundFrame, OutboundFrame};
use chat_core::Identity;

// ── Transport seam ────────────────────────────────────────────────────────────

/// Errors reported by a [`Transport`] or [`TransportFactory`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be opened.
    #[error("failed to open connection to {endpoint}: {reason}")]
    Open { endpoint: String, reason: String },

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Reading from the connection failed.
    #[error("receive failed: {0}")]
    Receive(String),
}

/// What a transport delivers when asked for the next inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A text payload, not yet decoded.
    Text(String),
    /// A payload that cannot be text (for example a binary frame).  It is
    /// treated like any other malformed payload.
    Unreadable(String),
}

/// One open bidirectional connection to the chat server.
#[async_trait]
pub trait Transport: Send {
    /// Writes one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Waits for the next inbound payload.
    ///
    /// Returns `None` once the peer has closed the connection.  Must be
    /// cancel-safe: dropping the future before it resolves must not lose a
    /// payload, because the client polls it inside `tokio::select!`.
    async fn recv(&mut self) -> Option<Result<Incoming, TransportError>>;

    /// Requests an orderly close.  Best effort; errors are swallowed.
    async fn close(&mut self);
}

/// Capability to open new transports.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Opens a fresh connection to the room.
    async fn open(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// A transport being opened, with the `join` frame already written once it
/// resolves.
pub type OpenFuture = BoxFuture<'static, Result<Box<dyn Transport>, TransportError>>;

// ── Session ───────────────────────────────────────────────────────────────────

/// Lifecycle states of a [`Session`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Created, nothing opened yet.
    #[default]
    Idle,
    /// Transport is being opened.
    Connecting,
    /// Join frame sent; messages may flow.
    Joined,
    /// Terminal.
    Closed,
}

/// Result of a [`Session::send_message`] call.
///
/// Only `Sent` writes a frame.  The skip outcomes are deliberate no-ops, not
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A `message` frame was written.
    Sent,
    /// The session was not `Joined`; nothing was written.
    NotJoined,
    /// The content was empty after trimming; nothing was written.
    EmptyContent,
    /// The frame could not be encoded or written; the session is now
    /// `Closed`.
    TransportClosed,
}

/// The single live connection of a client.
pub struct Session {
    id: Uuid,
    username: Identity,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
}

impl Session {
    /// Creates an idle session for `username`.
    pub fn new(username: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            state: SessionState::Idle,
            transport: None,
        }
    }

    /// Session id, used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &Identity {
        &self.username
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_joined(&self) -> bool {
        self.state == SessionState::Joined
    }

    /// Moves `Idle → Connecting` and returns the future that opens the
    /// transport and writes the `join` frame.
    ///
    /// No timeout is applied: an unresponsive server is only noticed through
    /// the transport's own error signalling.  Returns `None` when the session
    /// is not `Idle`.
    pub fn connect(&mut self, factory: Arc<dyn TransportFactory>) -> Option<OpenFuture> {
        if self.state != SessionState::Idle {
            warn!(
                "session {}: open requested in state {:?}; ignoring",
                self.id, self.state
            );
            return None;
        }

        self.state = SessionState::Connecting;
        info!("session {}: connecting as {}", self.id, self.username);

        let id = self.id;
        let join = OutboundFrame::Join {
            username: self.username.as_str().to_string(),
        };
        let open = async move {
            let mut transport = factory.open().await?;
            let sent = match encode_frame(&join) {
                Ok(text) => transport.send_text(text).await,
                Err(e) => Err(TransportError::Send(e.to_string())),
            };
            if let Err(e) = sent {
                transport.close().await;
                return Err(e);
            }
            debug!("session {id}: sent join frame");
            Ok(transport)
        };
        Some(open.boxed())
    }

    /// Applies the result of the future returned by [`Session::connect`].
    ///
    /// A transport that arrives after the session was closed is closed
    /// straight away.
    pub async fn finish_connect(
        &mut self,
        opened: Result<Box<dyn Transport>, TransportError>,
    ) -> SessionState {
        match opened {
            Ok(transport) if self.state == SessionState::Connecting => {
                self.transport = Some(transport);
                self.state = SessionState::Joined;
                info!("session {}: joined as {}", self.id, self.username);
            }
            Ok(mut transport) => {
                debug!(
                    "session {}: connection opened in state {:?}; discarding",
                    self.id, self.state
                );
                transport.close().await;
            }
            Err(e) => {
                warn!("session {}: {e}", self.id);
                self.state = SessionState::Closed;
            }
        }
        self.state
    }

    /// Opens the transport and sends the `join` frame in one step.
    ///
    /// Drives `Idle → Connecting → Joined`, or ends in `Closed` if the
    /// transport cannot be opened or the join frame cannot be written.
    /// Calling this on a session that is not `Idle` does nothing.
    pub async fn open(&mut self, factory: Arc<dyn TransportFactory>) -> SessionState {
        match self.connect(factory) {
            Some(open) => {
                let opened = open.await;
                self.finish_connect(opened).await
            }
            None => self.state,
        }
    }

    /// Sends a chat message.
    ///
    /// Skipped without error when the session is not `Joined` or when
    /// `content` is blank.  Content is sent exactly as given; trimming only
    /// decides whether it is blank.
    pub async fn send_message(&mut self, content: &str) -> SendOutcome {
        if self.state != SessionState::Joined {
            debug!(
                "session {}: send skipped in state {:?}",
                self.id, self.state
            );
            return SendOutcome::NotJoined;
        }
        if content.trim().is_empty() {
            return SendOutcome::EmptyContent;
        }

        let frame = OutboundFrame::Message {
            content: content.to_string(),
        };
        let Some(transport) = self.transport.as_mut() else {
            return SendOutcome::NotJoined;
        };
        let sent = match encode_frame(&frame) {
            Ok(text) => transport.send_text(text).await,
            Err(e) => Err(TransportError::Send(e.to_string())),
        };
        match sent {
            Ok(()) => {
                debug!("session {}: sent {} frame", self.id, frame.type_name());
                SendOutcome::Sent
            }
            Err(e) => {
                warn!("session {}: {e}; closing session", self.id);
                self.close().await;
                SendOutcome::TransportClosed
            }
        }
    }

    /// Waits for the next well-formed inbound frame.
    ///
    /// Payloads that fail to decode are logged and skipped; they never change
    /// the session state.  Returns `None` when the session is not `Joined`,
    /// or when the transport closes or fails, in which case the session moves
    /// to `Closed` first.
    ///
    /// Cancel-safe as long as the transport's `recv` is.
    pub async fn next_frame(&mut self) -> Option<InboundFrame> {
        loop {
            let transport = self.transport.as_mut()?;

            match transport.recv().await {
                Some(Ok(Incoming::Text(text))) => match decode_frame(&text) {
                    Ok(frame) => {
                        debug!("session {}: received {}", self.id, frame.type_name());
                        return Some(frame);
                    }
                    Err(e) => {
                        warn!("session {}: dropping inbound frame: {e}", self.id);
                    }
                },
                Some(Ok(Incoming::Unreadable(what))) => {
                    warn!("session {}: dropping unreadable frame ({what})", self.id);
                }
                Some(Err(e)) => {
                    warn!("session {}: {e}; closing session", self.id);
                    self.close().await;
                    return None;
                }
                None => {
                    info!("session {}: connection closed by server", self.id);
                    self.close().await;
                    return None;
                }
            }
        }
    }

    /// Closes the session.  Safe to call any number of times.
    pub async fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            info!("session {}: closed", self.id);
        } else if previous == SessionState::Connecting {
            info!("session {}: connection attempt abandoned", self.id);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("state", &self.state)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::mock::{MockTransportFactory, MockTransportHandle};

    fn bobby() -> Identity {
        Identity::parse("bobby").unwrap()
    }

    fn mock() -> (Arc<dyn TransportFactory>, MockTransportHandle) {
        let (factory, handle) = MockTransportFactory::new();
        (Arc::new(factory), handle)
    }

    #[tokio::test]
    async fn test_new_session_is_idle() {
        let session = Session::new(bobby());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.username().as_str(), "bobby");
    }

    #[tokio::test]
    async fn test_open_sends_exactly_one_join_frame() {
        // Arrange
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());

        // Act
        let state = session.open(Arc::clone(&factory)).await;

        // Assert
        assert_eq!(state, SessionState::Joined);
        assert_eq!(
            handle.sent_frames(),
            vec![r#"{"type":"join","username":"bobby"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_open_failure_closes_session() {
        let (factory, handle) = mock();
        handle.fail_next_open();
        let mut session = Session::new(bobby());

        let state = session.open(Arc::clone(&factory)).await;

        assert_eq!(state, SessionState::Closed);
        assert!(handle.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn test_open_twice_does_not_reopen() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;

        session.open(Arc::clone(&factory)).await;

        assert_eq!(handle.open_count(), 1);
        assert_eq!(handle.sent_frames().len(), 1);
    }

    #[tokio::test]
    async fn test_send_before_open_is_noop() {
        let (_factory, handle) = mock();
        let mut session = Session::new(bobby());

        let outcome = session.send_message("hello").await;

        assert_eq!(outcome, SendOutcome::NotJoined);
        assert!(handle.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn test_send_blank_content_is_noop() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;

        assert_eq!(session.send_message("").await, SendOutcome::EmptyContent);
        assert_eq!(session.send_message("  \t ").await, SendOutcome::EmptyContent);
        assert_eq!(handle.sent_frames().len(), 1, "only the join frame");
    }

    #[tokio::test]
    async fn test_send_keeps_content_untrimmed() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;

        let outcome = session.send_message("  hi  ").await;

        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(
            handle.sent_frames()[1],
            r#"{"type":"message","content":"  hi  "}"#
        );
    }

    #[tokio::test]
    async fn test_send_failure_closes_session() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;
        handle.fail_sends();

        let outcome = session.send_message("hello").await;

        assert_eq!(outcome, SendOutcome::TransportClosed);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_next_frame_skips_malformed_payloads() {
        // Arrange
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;
        handle.push_text("not json");
        handle.push_binary();
        handle.push_text(r#"{"username":"alice","message":"alice: hi"}"#);

        // Act
        let frame = session.next_frame().await;

        // Assert: the bad payloads are skipped and the state is unchanged
        assert!(matches!(frame, Some(InboundFrame::Chat(_))));
        assert_eq!(session.state(), SessionState::Joined);
    }

    #[tokio::test]
    async fn test_peer_hangup_closes_session() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;
        handle.hang_up();

        let frame = session.next_frame().await;

        assert!(frame.is_none());
        assert_eq!(session.state(), SessionState::Closed);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_receive_error_closes_session() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;
        handle.push_error("connection reset");

        assert!(session.next_frame().await.is_none());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;

        session.close().await;
        session.close().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(handle.close_count(), 1);
    }

    #[tokio::test]
    async fn test_closed_session_cannot_send_or_reopen() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        session.open(Arc::clone(&factory)).await;
        session.close().await;

        assert_eq!(session.send_message("late").await, SendOutcome::NotJoined);
        assert_eq!(session.open(Arc::clone(&factory)).await, SessionState::Closed);
        assert_eq!(handle.open_count(), 1);
    }

    #[tokio::test]
    async fn test_next_frame_on_idle_session_returns_none() {
        let mut session = Session::new(bobby());
        assert!(session.next_frame().await.is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_connect_moves_to_connecting_before_open_resolves() {
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());

        let open = session.connect(Arc::clone(&factory));

        assert!(open.is_some());
        assert_eq!(session.state(), SessionState::Connecting);
        assert_eq!(handle.open_count(), 0, "nothing opened until polled");
    }

    #[tokio::test]
    async fn test_close_while_connecting_discards_late_transport() {
        // Arrange
        let (factory, handle) = mock();
        let mut session = Session::new(bobby());
        let open = session.connect(Arc::clone(&factory)).unwrap();

        // Act: the caller tears down before the handshake result is applied
        session.close().await;
        let opened = open.await;
        let state = session.finish_connect(opened).await;

        // Assert
        assert_eq!(state, SessionState::Closed);
        assert!(handle.is_closed());
        assert_eq!(session.send_message("late").await, SendOutcome::NotJoined);
    }
}
