//! Application layer of the chat client.
//!
//! # What lives here?
//!
//! - **`session`** – the Session state machine and the `Transport` /
//!   `TransportFactory` capability traits it is built on.  The concrete
//!   transports are injected from the infrastructure layer.
//!
//! - **`roster`** – the `RosterFetcher` seam for the one-shot roster query.
//!
//! - **`chat_client`** – `ChatClient`, the facade a renderer drives with
//!   `set_identity`, `join`, `send_message` and `leave`, and reads through
//!   `snapshot`.
//!
//! - **`event_loop`** – `run_event_loop`, the single task that owns the
//!   client and serializes user commands and inbound frames.

pub mod chat_client;
pub mod event_loop;
pub mod roster;
pub mod session;
