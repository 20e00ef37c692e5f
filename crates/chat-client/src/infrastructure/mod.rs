//! Infrastructure layer of the chat client.
//!
//! Contains the adapters that touch the outside world.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `chat_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.
//!
//! # Sub-modules
//!
//! - **`transport`** – WebSocket implementation of `TransportFactory` plus an
//!   in-memory `MockTransportFactory` for tests.
//! - **`http_roster`** – `reqwest` implementation of `RosterFetcher`.
//! - **`config`** – TOML configuration file.
//! - **`ui_bridge`** – serializable state DTOs and the terminal line renderer.

pub mod config;
pub mod http_roster;
pub mod transport;
pub mod ui_bridge;
