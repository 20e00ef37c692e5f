//! ChatClient: the consumer-facing facade of the chat core.
//!
//! A renderer talks to the core through four commands and one read-only
//! state surface:
//!
//! ```text
//!   set_identity(candidate) ─┐
//!   begin_join() / join()    ├──> ChatClient ──> snapshot() -> ChatSnapshot
//!   send_message(content)    │       │
//!   leave()                 ─┘       └── next_update(): connection result,
//!                                        roster refreshes, inbound frames
//! ```
//!
//! `ChatClient` owns at most one [`Session`] and the [`ChatView`] derived from
//! it.  Every error the core can hit is turned into state here: a validation
//! message, a stale roster, or a `Closed` session.
//!
//! Nothing slow is awaited inside a command.  The transport handshake is
//! parked as a pending future and roster queries run on their own tasks;
//! both report back through [`ChatClient::next_update`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use chat_core::protocol::frames::InboundFrame;
use chat_core::{reconcile, ChatEvent, ChatView, Identity, ReconcileEffect, ValidationError};

use crate::application::roster::{FetchError, RosterFetcher};
use crate::application::session::{
    OpenFuture, SendOutcome, Session, SessionState, Transport, TransportError, TransportFactory,
};

/// Why `join` refused to start a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// The username gate rejected the candidate.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The candidate is long enough but contains only whitespace.
    #[error("Name must not be blank.")]
    BlankIdentity,
}

/// What a call to [`ChatClient::next_update`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientUpdate {
    /// The handshake finished and the session is `Joined`.
    Joined,
    RosterReplaced,
    /// A roster query failed; the last known roster is kept.
    RosterRefreshFailed,
    MessageAppended,
    /// The connection failed or closed; the session is now `Closed`.
    SessionClosed,
}

/// Read-only projection of the client state for a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub session_state: SessionState,
    /// Id of the current session.  Changes on every join, so a renderer can
    /// tell a fresh transcript from a continued one.
    pub session_id: Option<Uuid>,
    /// Username of the current session, if one has been started.
    pub username: Option<String>,
    pub transcript: Vec<ChatEvent>,
    pub roster: Vec<String>,
    /// User-facing validation message for the current candidate.
    pub validation_error: Option<String>,
    /// Whether the join action should be enabled.
    pub can_submit: bool,
}

type RosterResult = Result<Vec<String>, FetchError>;

/// The chat core behind a renderer.
pub struct ChatClient {
    transports: Arc<dyn TransportFactory>,
    roster_source: Arc<dyn RosterFetcher>,
    candidate: String,
    validation_error: Option<ValidationError>,
    session: Option<Session>,
    pending_open: Option<OpenFuture>,
    roster_tx: mpsc::UnboundedSender<RosterResult>,
    roster_rx: mpsc::UnboundedReceiver<RosterResult>,
    refreshes_in_flight: usize,
    view: ChatView,
}

impl ChatClient {
    pub fn new(transports: Arc<dyn TransportFactory>, roster_source: Arc<dyn RosterFetcher>) -> Self {
        let (roster_tx, roster_rx) = mpsc::unbounded_channel();
        Self {
            transports,
            roster_source,
            candidate: String::new(),
            validation_error: None,
            session: None,
            pending_open: None,
            roster_tx,
            roster_rx,
            refreshes_in_flight: 0,
            view: ChatView::new(),
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Updates the candidate username and re-runs the gate.
    ///
    /// Never fails: an invalid candidate is stored along with its validation
    /// error so the user can keep typing.  The username of a running session
    /// is not affected.
    pub fn set_identity(&mut self, candidate: impl Into<String>) {
        self.candidate = candidate.into();
        self.validation_error = chat_core::validate(&self.candidate).err();
    }

    /// Starts a new session under the current candidate without waiting for
    /// the connection.
    ///
    /// Refused when the gate rejects the candidate or it is blank; nothing is
    /// opened in that case.  Otherwise any previous session (or pending
    /// handshake) is closed, the transcript is cleared, and the new session
    /// is left in `Connecting`.  The handshake result is applied by
    /// [`ChatClient::next_update`].
    pub async fn begin_join(&mut self) -> Result<(), JoinError> {
        let identity = match Identity::parse(self.candidate.as_str()) {
            Ok(identity) => identity,
            Err(e) => {
                self.validation_error = Some(e.clone());
                return Err(JoinError::Invalid(e));
            }
        };
        if identity.as_str().trim().is_empty() {
            return Err(JoinError::BlankIdentity);
        }

        self.pending_open = None;
        if let Some(mut previous) = self.session.take() {
            previous.close().await;
        }
        self.view.start_session();

        let mut session = Session::new(identity);
        self.pending_open = session.connect(Arc::clone(&self.transports));
        self.session = Some(session);
        Ok(())
    }

    /// [`ChatClient::begin_join`], then waits for the handshake.
    ///
    /// The returned state is `Joined` on success and `Closed` if the
    /// connection failed.
    pub async fn join(&mut self) -> Result<SessionState, JoinError> {
        self.begin_join().await?;
        if let Some(open) = self.pending_open.take() {
            let opened = open.await;
            self.finish_open(opened).await;
        }
        Ok(self.session_state())
    }

    /// Sends a chat message on the current session.
    ///
    /// While joined, a roster refresh is started alongside; the frame does not
    /// wait for it.  Outside `Joined` nothing happens at all: no frame and no
    /// fetch.
    pub async fn send_message(&mut self, content: &str) -> SendOutcome {
        if self.session_state() != SessionState::Joined {
            return SendOutcome::NotJoined;
        }
        self.request_roster_refresh();

        match self.session.as_mut() {
            Some(session) => session.send_message(content).await,
            None => SendOutcome::NotJoined,
        }
    }

    /// Leaves the room, abandoning a handshake still in progress.  Does
    /// nothing if there is no open session.
    pub async fn leave(&mut self) {
        self.pending_open = None;
        if let Some(session) = self.session.as_mut() {
            session.close().await;
        }
    }

    /// Starts a one-shot roster query on its own task.
    ///
    /// The result is applied by [`ChatClient::next_update`]; results are
    /// applied in completion order.
    pub fn request_roster_refresh(&mut self) {
        let source = Arc::clone(&self.roster_source);
        let results = self.roster_tx.clone();
        self.refreshes_in_flight += 1;
        tokio::spawn(async move {
            // The receiver only goes away with the client.
            let _ = results.send(source.fetch_roster().await);
        });
    }

    /// Runs a roster query and waits for it.
    ///
    /// On failure the error is logged and the previous roster is kept.
    pub async fn refresh_roster(&mut self) {
        let result = self.roster_source.fetch_roster().await;
        self.apply_roster(result);
    }

    // ── Inbound pump ──────────────────────────────────────────────────────────

    /// Whether [`ChatClient::next_update`] has anything to wait for.
    pub fn has_pending_updates(&self) -> bool {
        self.pending_open.is_some() || self.refreshes_in_flight > 0 || self.is_joined()
    }

    /// Waits for the next thing that changes the client state and applies it.
    ///
    /// Sources are the pending handshake, finished roster queries and inbound
    /// frames of a joined session.  Returns `None` immediately when there is
    /// none of them.  Cancel-safe, so it can be raced against user commands in
    /// `tokio::select!`.
    pub async fn next_update(&mut self) -> Option<ClientUpdate> {
        let connecting = self.pending_open.is_some();
        let refreshing = self.refreshes_in_flight > 0;
        let joined = self.is_joined();
        if !(connecting || refreshing || joined) {
            return None;
        }

        tokio::select! {
            opened = poll_open(&mut self.pending_open), if connecting => {
                self.pending_open = None;
                Some(match self.finish_open(opened).await {
                    SessionState::Joined => ClientUpdate::Joined,
                    _ => ClientUpdate::SessionClosed,
                })
            }
            Some(result) = self.roster_rx.recv(), if refreshing => {
                self.refreshes_in_flight -= 1;
                Some(self.apply_roster(result))
            }
            frame = next_frame(&mut self.session), if joined => match frame {
                Some(frame) => Some(self.apply_frame(frame)),
                None => {
                    if let Some(session) = self.session.as_ref() {
                        info!("session {} ended", session.id());
                    }
                    Some(ClientUpdate::SessionClosed)
                }
            },
        }
    }

    async fn finish_open(
        &mut self,
        opened: Result<Box<dyn Transport>, TransportError>,
    ) -> SessionState {
        match self.session.as_mut() {
            Some(session) => session.finish_connect(opened).await,
            None => {
                if let Ok(mut transport) = opened {
                    transport.close().await;
                }
                SessionState::Closed
            }
        }
    }

    fn apply_roster(&mut self, result: RosterResult) -> ClientUpdate {
        match result {
            Ok(users) => {
                debug!("roster refreshed ({} users)", users.len());
                self.view.apply(ReconcileEffect::ReplaceRoster(users));
                ClientUpdate::RosterReplaced
            }
            Err(e) => {
                warn!(
                    "{e}; keeping last known roster ({} users)",
                    self.view.roster().len()
                );
                ClientUpdate::RosterRefreshFailed
            }
        }
    }

    fn apply_frame(&mut self, frame: InboundFrame) -> ClientUpdate {
        let effect = reconcile(frame);
        let update = match effect {
            ReconcileEffect::ReplaceRoster(_) => ClientUpdate::RosterReplaced,
            ReconcileEffect::AppendTranscript(_) => ClientUpdate::MessageAppended,
        };
        self.view.apply(effect);
        update
    }

    // ── State surface ─────────────────────────────────────────────────────────

    /// State of the current session; `Idle` when none has been started.
    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(Session::state)
            .unwrap_or(SessionState::Idle)
    }

    fn is_joined(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_joined)
    }

    /// Username of the current session.
    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username().as_str())
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn view(&self) -> &ChatView {
        &self.view
    }

    pub fn can_submit(&self) -> bool {
        self.validation_error.is_none() && !self.candidate.trim().is_empty()
    }

    /// Captures the current state for a renderer.
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            session_state: self.session_state(),
            session_id: self.session.as_ref().map(Session::id),
            username: self.username().map(str::to_string),
            transcript: self.view.transcript().as_slice().to_vec(),
            roster: self.view.roster().as_slice().to_vec(),
            validation_error: self.validation_error.as_ref().map(ToString::to_string),
            can_submit: self.can_submit(),
        }
    }
}

async fn poll_open(pending: &mut Option<OpenFuture>) -> Result<Box<dyn Transport>, TransportError> {
    match pending.as_mut() {
        Some(open) => open.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(session: &mut Option<Session>) -> Option<InboundFrame> {
    match session.as_mut() {
        Some(session) => session.next_frame().await,
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
