//! Presentation interpretation of chat events.
//!
//! The server does not tag join/leave notices as separate frame types.
//! Instead it sends ordinary chat events whose text contains a fixed phrase:
//!
//! ```text
//! "carol has joined the chat"    →  join notice
//! "carol has left the chat"      →  leave notice
//! "carol: see you: tomorrow"     →  message from "carol", content "see you: tomorrow"
//! ```
//!
//! This module turns an event into a [`RenderedEvent`] that a renderer can
//! draw directly.  It is read-only: nothing here changes the transcript or
//! the roster.
//!
//! # Known ambiguity
//!
//! Classification is a plain substring match, so a user message that happens
//! to contain one of the phrases (for example `"bob: dave has left the chat
//! already?"`) is shown as a notice.  The wire protocol gives the client no
//! way to tell the difference, so the behavior is kept as-is.

use crate::protocol::frames::ChatEvent;

/// Phrase that marks a join notice.
pub const JOINED_SENTINEL: &str = "has joined the chat";

/// Phrase that marks a leave notice.
pub const LEFT_SENTINEL: &str = "has left the chat";

/// Separator between the speaker and the content of a message.
pub const SPEAKER_DELIMITER: &str = ": ";

/// What kind of transcript entry an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Someone joined the room.
    Joined,
    /// Someone left the room.
    Left,
    /// A normal chat message.
    Message,
}

/// Horizontal placement of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Join/leave notices are centered.
    Centered,
    /// Messages written by the local user, right-aligned.
    Local,
    /// Messages from everyone else, left-aligned.
    Remote,
}

/// Which side of the bubble the avatar is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSide {
    Left,
    Right,
}

impl Alignment {
    /// Avatar placement for this alignment; notices have no avatar.
    pub fn avatar_side(self) -> Option<AvatarSide> {
        match self {
            Alignment::Centered => None,
            Alignment::Local => Some(AvatarSide::Right),
            Alignment::Remote => Some(AvatarSide::Left),
        }
    }
}

/// A chat event ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEvent {
    pub kind: EventKind,
    /// Speaker name for messages; the notice text for join/leave notices.
    pub speaker: String,
    /// Message body.  Empty for notices.
    pub content: String,
    pub alignment: Alignment,
}

/// Splits event text on the first `": "`.
///
/// Text without a delimiter is all speaker and no content.
///
/// ```rust
/// use chat_core::domain::presentation::split_speaker;
///
/// assert_eq!(split_speaker("alice: hello: world"), ("alice", "hello: world"));
/// assert_eq!(split_speaker("no delimiter"), ("no delimiter", ""));
/// ```
pub fn split_speaker(text: &str) -> (&str, &str) {
    text.split_once(SPEAKER_DELIMITER).unwrap_or((text, ""))
}

/// Classifies an event by its sentinel phrases.  The join phrase is checked
/// first.
pub fn classify(event: &ChatEvent) -> EventKind {
    if event.message.contains(JOINED_SENTINEL) {
        EventKind::Joined
    } else if event.message.contains(LEFT_SENTINEL) {
        EventKind::Left
    } else {
        EventKind::Message
    }
}

/// Interprets `event` for display.
///
/// `local_username` is the username of the local session, if any.  A message
/// is [`Alignment::Local`] when the speaker embedded in its text equals it.
pub fn interpret(event: &ChatEvent, local_username: Option<&str>) -> RenderedEvent {
    let (speaker, content) = split_speaker(&event.message);

    match classify(event) {
        kind @ (EventKind::Joined | EventKind::Left) => RenderedEvent {
            kind,
            speaker: speaker.to_string(),
            content: String::new(),
            alignment: Alignment::Centered,
        },
        EventKind::Message => {
            let alignment = if local_username == Some(speaker) {
                Alignment::Local
            } else {
                Alignment::Remote
            };
            RenderedEvent {
                kind: EventKind::Message,
                speaker: speaker.to_string(),
                content: content.to_string(),
                alignment,
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
