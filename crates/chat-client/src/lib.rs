//! chat-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does chat-client do? (for beginners)
//!
//! It is the live half of the chat application.  Given a username it:
//!
//! 1. Checks the name against the username gate (at least 4 characters).
//! 2. Opens a WebSocket to the room and announces itself with a `join` frame.
//! 3. Receives chat events and roster pushes, appending events to the
//!    transcript in arrival order and replacing the roster wholesale.
//! 4. Sends `message` frames for what the user types, refreshing the roster
//!    with a one-shot HTTP query alongside each send.
//! 5. Publishes a read-only snapshot after every change so a renderer (the
//!    terminal front end in `main.rs`, or anything else) can draw it.

/// Application layer: session lifecycle, client facade, event loop.
pub mod application;

/// Infrastructure layer: WebSocket, HTTP roster query, config, render bridge.
pub mod infrastructure;

pub use application::chat_client::{ChatClient, ChatSnapshot, ClientUpdate, JoinError};
pub use application::event_loop::{run_event_loop, ClientCommand};
pub use application::session::{SendOutcome, Session, SessionState};
