//! Render bridge for the chat client.
//!
//! Turns the core's [`ChatSnapshot`] into plain serializable DTOs a renderer
//! can draw without knowing anything about sessions or frames.  Every
//! transcript entry is classified once here (notice vs. bubble, own vs.
//! other, avatar side) so the renderer does no string inspection of its own.
//!
//! ```text
//! ChatSnapshot ──> ChatStateDto { session_state, entries[], roster[], .. }
//!                        │
//!                        └─> format_entry(): one terminal line per entry
//! ```
//!
//! # `ChatCommandResult<T>`
//!
//! Queries return a unified envelope so a JSON consumer has a single
//! error-handling pattern:
//! ```json
//! { "success": true,  "data": {...}, "error": null  }
//! { "success": false, "data": null,  "error": "..."  }
//! ```

use serde::{Deserialize, Serialize};

use chat_core::domain::presentation::{interpret, Alignment, AvatarSide, EventKind};

use crate::application::chat_client::ChatSnapshot;
use crate::application::session::SessionState;

/// Width the terminal renderer right-aligns own messages to.
pub const LINE_WIDTH: usize = 72;

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Kind of a transcript entry, as a renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Message,
    Joined,
    Left,
}

/// One classified transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntryDto {
    pub kind: EntryKind,
    /// Speaker for messages; notice text for join/leave notices.
    pub display_name: String,
    pub content: String,
    /// `true` for messages written under the local session's username.
    pub is_own: bool,
    /// `"left"` / `"right"`, or absent for notices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_side: Option<String>,
}

/// Full state snapshot for a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStateDto {
    /// `"idle"`, `"connecting"`, `"joined"` or `"closed"`.
    pub session_state: String,
    pub username: Option<String>,
    pub entries: Vec<TranscriptEntryDto>,
    pub roster: Vec<String>,
    pub validation_error: Option<String>,
    pub can_submit: bool,
}

/// Unified response wrapper for bridge queries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ChatCommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

fn session_state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Connecting => "connecting",
        SessionState::Joined => "joined",
        SessionState::Closed => "closed",
    }
}

impl ChatStateDto {
    /// Builds the DTO, classifying every transcript entry against the
    /// snapshot's own username.
    pub fn from_snapshot(snapshot: &ChatSnapshot) -> Self {
        let local = snapshot.username.as_deref();
        let entries = snapshot
            .transcript
            .iter()
            .map(|event| {
                let rendered = interpret(event, local);
                TranscriptEntryDto {
                    kind: match rendered.kind {
                        EventKind::Message => EntryKind::Message,
                        EventKind::Joined => EntryKind::Joined,
                        EventKind::Left => EntryKind::Left,
                    },
                    display_name: rendered.speaker,
                    content: rendered.content,
                    is_own: rendered.alignment == Alignment::Local,
                    avatar_side: rendered.alignment.avatar_side().map(|side| {
                        match side {
                            AvatarSide::Left => "left",
                            AvatarSide::Right => "right",
                        }
                        .to_string()
                    }),
                }
            })
            .collect();

        Self {
            session_state: session_state_name(snapshot.session_state).to_string(),
            username: snapshot.username.clone(),
            entries,
            roster: snapshot.roster.clone(),
            validation_error: snapshot.validation_error.clone(),
            can_submit: snapshot.can_submit,
        }
    }
}

/// Returns the renderer view of `snapshot`.
pub fn get_chat_state(snapshot: &ChatSnapshot) -> ChatCommandResult<ChatStateDto> {
    ChatCommandResult::ok(ChatStateDto::from_snapshot(snapshot))
}

/// Renders one entry as a single terminal line.
///
/// Notices are centered, own messages right-aligned, others left-aligned.
pub fn format_entry(entry: &TranscriptEntryDto) -> String {
    match entry.kind {
        EntryKind::Joined | EntryKind::Left => {
            let notice = format!("-- {} --", entry.display_name);
            format!("{notice:^LINE_WIDTH$}").trim_end().to_string()
        }
        EntryKind::Message => {
            let line = if entry.content.is_empty() {
                entry.display_name.clone()
            } else {
                format!("{}: {}", entry.display_name, entry.content)
            };
            if entry.is_own {
                format!("{line:>LINE_WIDTH$}")
            } else {
                line
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
