//! Domain layer for the chat client.
//!
//! Pure business rules with no infrastructure dependencies: no sockets, no
//! async runtime, no terminal.  Everything here can be tested in isolation.
//!
//! # What lives here?
//!
//! - **`identity`** – the Username Gate: which candidate names may join.
//! - **`transcript`** – the two derived views: the append-only transcript and
//!   the presence roster.
//! - **`reconcile`** – the Event Reconciler: turns inbound frames into
//!   effects on those views.
//! - **`presentation`** – how a renderer should interpret a chat event
//!   (join/leave notice vs. message bubble, own vs. remote).  It never
//!   mutates state.

pub mod identity;
pub mod presentation;
pub mod reconcile;
pub mod transcript;

pub use identity::{validate, Identity, ValidationError, MIN_IDENTITY_LEN};
pub use presentation::{interpret, split_speaker, Alignment, AvatarSide, EventKind, RenderedEvent};
pub use reconcile::{reconcile, ChatView, ReconcileEffect};
pub use transcript::{Roster, Transcript};
