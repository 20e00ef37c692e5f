//! Event Reconciler: merges inbound frames into the transcript and roster.
//!
//! # Two producers, one roster
//!
//! The roster has two independent sources:
//!
//! ```text
//! push: connected-users frame on the room connection ──┐
//!                                                       ├──> ReplaceRoster
//! pull: one-shot HTTP roster query ─────────────────────┘
//! ```
//!
//! Both produce [`ReconcileEffect::ReplaceRoster`] and the last one applied
//! wins.  The two may disagree for a while; consumers must tolerate that.
//!
//! Join/leave notices in the transcript are presentation signals only and are
//! never used to patch the roster.

use tracing::trace;

use crate::domain::transcript::{Roster, Transcript};
use crate::protocol::frames::{ChatEvent, InboundFrame};

/// The state change an inbound frame asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEffect {
    /// Replace the roster with exactly these users.
    ReplaceRoster(Vec<String>),
    /// Append this event to the transcript.
    AppendTranscript(ChatEvent),
}

/// Maps an inbound frame to its effect.
///
/// Roster frames replace the roster; every other frame is a chat event and is
/// appended to the transcript verbatim.
pub fn reconcile(frame: InboundFrame) -> ReconcileEffect {
    match frame {
        InboundFrame::Roster(users) => ReconcileEffect::ReplaceRoster(users),
        InboundFrame::Chat(event) => ReconcileEffect::AppendTranscript(event),
    }
}

/// The derived views of one client: transcript plus roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatView {
    transcript: Transcript,
    roster: Roster,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one effect.
    pub fn apply(&mut self, effect: ReconcileEffect) {
        match effect {
            ReconcileEffect::ReplaceRoster(users) => {
                trace!("roster replaced: {} -> {} users", self.roster.len(), users.len());
                self.roster.replace(users);
            }
            ReconcileEffect::AppendTranscript(event) => {
                self.transcript.append(event);
                trace!("transcript length now {}", self.transcript.len());
            }
        }
    }

    /// Resets the per-session part of the view.
    ///
    /// The transcript only covers the current session, so it is cleared.  The
    /// roster is left alone until the next push or pull replaces it.
    pub fn start_session(&mut self) {
        trace!("clearing {} transcript entries", self.transcript.len());
        self.transcript.clear();
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
