//! JSON frame types exchanged with the chat server.
//!
//! The room connection carries one JSON object per WebSocket text frame.
//! Outbound frames carry an explicit `"type"` discriminant:
//!
//! ```json
//! {"type":"join","username":"bobby"}
//! {"type":"message","content":"hello everyone"}
//! ```
//!
//! Inbound traffic has two shapes.  The presence roster is tagged:
//!
//! ```json
//! {"type":"connected-users","connectedUsers":["alice","bobby"]}
//! ```
//!
//! Everything else is an untagged chat event produced by the server when it
//! broadcasts a message or a join/leave notice:
//!
//! ```json
//! {"username":"alice","message":"alice: hello everyone"}
//! {"username":"carol","message":"carol has joined the chat"}
//! ```
//!
//! # Why separate inbound and outbound types?
//!
//! The client never receives `join`/`message` frames and never sends roster
//! frames.  Two enums make it a compile-time error to push a frame in the
//! wrong direction.

use serde::{Deserialize, Serialize};

/// Value of the `"type"` field on an inbound presence-roster frame.
pub const ROSTER_FRAME_TYPE: &str = "connected-users";

// ── Client → server ───────────────────────────────────────────────────────────

/// Every frame the client may write to the room connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
// `tag = "type"` places the variant name in a `"type"` field next to the
// variant's own fields, which is exactly the shape the server expects.
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    /// Announces the local identity.  Sent exactly once, right after the
    /// transport opens.
    Join {
        /// The validated username the session was created with.
        username: String,
    },

    /// A chat message typed by the user.
    ///
    /// The server attributes it to the session's username and broadcasts an
    /// enriched [`ChatEvent`] to every participant, including the sender.
    Message {
        /// Message text exactly as typed (not trimmed).
        content: String,
    },
}

impl OutboundFrame {
    /// Returns the wire discriminant of this frame.
    ///
    /// Used in log messages so that message text never ends up in the logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            OutboundFrame::Join { .. } => "join",
            OutboundFrame::Message { .. } => "message",
        }
    }
}

// ── Server → client ───────────────────────────────────────────────────────────

/// A chat event broadcast by the server.
///
/// `message` is either free text in the form `"<speaker>: <content>"` or a
/// notice containing one of the join/leave sentinel phrases (see
/// [`crate::domain::presentation`]).  Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Username the server attached to the event.
    pub username: String,
    /// Event text.
    pub message: String,
}

impl ChatEvent {
    /// Convenience constructor, mostly used by tests and fixtures.
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
        }
    }
}

/// A decoded inbound frame.
///
/// This type is not deserialized directly: the roster shape is selected by
/// its `"type"` field and everything else falls back to [`ChatEvent`].  See
/// [`crate::protocol::codec::decode_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Authoritative list of connected users, in server order.
    Roster(Vec<String>),
    /// A chat event to append to the transcript.
    Chat(ChatEvent),
}

impl InboundFrame {
    /// Returns a short name for log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            InboundFrame::Roster(_) => ROSTER_FRAME_TYPE,
            InboundFrame::Chat(_) => "chat-event",
        }
    }
}

/// Body of the roster payload, shared by the push frame and the one-shot
/// HTTP roster query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterResponse {
    /// Connected usernames.
    #[serde(rename = "connectedUsers")]
    pub connected_users: Vec<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
