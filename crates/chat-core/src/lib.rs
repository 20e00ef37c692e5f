//! # chat-core
//!
//! Shared library for the Dev Chat client containing the JSON wire protocol,
//! the username gate, and the event reconciler.
//!
//! It has zero dependencies on sockets, async runtimes, or UI frameworks.
//!
//! # Architecture overview (for beginners)
//!
//! Dev Chat is a single-room, real-time group chat.  A client joins the room
//! over a persistent WebSocket connection under a username, then exchanges
//! small JSON frames with the server:
//!
//! ```text
//! client ── {"type":"join","username":"bobby"} ──────────────> server
//! client ── {"type":"message","content":"hi"} ───────────────> server
//! client <─ {"username":"bobby","message":"bobby: hi"} ─────── server
//! client <─ {"type":"connected-users","connectedUsers":[..]} ─ server
//! ```
//!
//! This crate is the pure foundation:
//!
//! - **`protocol`** – frame types and the JSON codec.
//! - **`domain`** – identity validation, the transcript and roster views, the
//!   reconciler that maps frames onto them, and the presentation rules a
//!   renderer applies to each chat event.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `chat_core::ChatView` instead of `chat_core::domain::reconcile::ChatView`.
pub use domain::identity::{validate, Identity, ValidationError};
pub use domain::reconcile::{reconcile, ChatView, ReconcileEffect};
pub use protocol::codec::{decode_frame, encode_frame, ProtocolError};
pub use protocol::frames::{ChatEvent, InboundFrame, OutboundFrame};
