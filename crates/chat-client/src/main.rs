//! Dev Chat terminal client entry point.
//!
//! A line-oriented front end over the chat core.  Before joining, each line
//! typed is a username candidate; once joined, each line is a message.
//!
//! # Usage
//!
//! ```text
//! chat-client [OPTIONS]
//!
//! Options:
//!   --config     <PATH>   Config file [default: platform config dir]
//!   --ws-url     <URL>    Room WebSocket endpoint
//!   --roster-url <URL>    Roster query endpoint
//!   --username   <NAME>   Join immediately under this name
//!   --log-level  <LEVEL>  Log filter when RUST_LOG is unset
//! ```
//!
//! In the room:
//!
//! | Input    | Effect                                 |
//! |----------|----------------------------------------|
//! | `/who`   | print the roster                       |
//! | `/state` | print the full render state as JSON    |
//! | `/leave` | leave the room, back to the name prompt|
//! | `/quit`  | leave and exit                         |
//! | anything | send as a message                      |
//!
//! # Environment variable overrides
//!
//! | Variable          | Flag           |
//! |-------------------|----------------|
//! | `CHAT_WS_URL`     | `--ws-url`     |
//! | `CHAT_ROSTER_URL` | `--roster-url` |
//! | `CHAT_USERNAME`   | `--username`   |
//! | `CHAT_LOG_LEVEL`  | `--log-level`  |
//!
//! CLI values take precedence over the config file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use chat_client::application::chat_client::{ChatClient, ChatSnapshot, JoinError};
use chat_client::application::event_loop::{run_event_loop, ClientCommand};
use chat_client::application::session::SessionState;
use chat_client::infrastructure::config::{load_config, ClientConfig};
use chat_client::infrastructure::http_roster::HttpRosterFetcher;
use chat_client::infrastructure::transport::WebSocketTransportFactory;
use chat_client::infrastructure::ui_bridge::{format_entry, get_chat_state, ChatStateDto};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Dev Chat terminal client.
#[derive(Debug, Parser)]
#[command(
    name = "chat-client",
    about = "Terminal client for the Dev Chat real-time group chat",
    version
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// WebSocket endpoint of the chat room.
    #[arg(long, env = "CHAT_WS_URL")]
    ws_url: Option<String>,

    /// HTTP endpoint of the one-shot roster query.
    #[arg(long, env = "CHAT_ROSTER_URL")]
    roster_url: Option<String>,

    /// Username to join under immediately.
    #[arg(long, env = "CHAT_USERNAME")]
    username: Option<String>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "CHAT_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Layers the CLI values over the config loaded from file.
    fn into_client_config(self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = self.ws_url {
            config.server.ws_url = url;
        }
        if let Some(url) = self.roster_url {
            config.server.roster_url = url;
        }
        if let Some(name) = self.username {
            config.client.username = Some(name);
        }
        if let Some(level) = self.log_level {
            config.client.log_level = level;
        }
        config
    }
}

// ── Terminal input ────────────────────────────────────────────────────────────

/// What one line of terminal input means in the current state.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Identity(String),
    Message(String),
    Who,
    State,
    Leave,
    Quit,
}

fn parse_input(line: &str, in_room: bool) -> Input {
    match line.trim() {
        "/quit" => return Input::Quit,
        "/state" => return Input::State,
        _ => {}
    }
    if !in_room {
        return Input::Identity(line.to_string());
    }
    match line.trim() {
        "/who" => Input::Who,
        "/leave" => Input::Leave,
        _ => Input::Message(line.to_string()),
    }
}

/// How much of which session's transcript is already on screen.
#[derive(Debug, Default)]
struct PrintCursor {
    session: Option<Uuid>,
    printed: usize,
}

/// Returns the lines for transcript entries not printed yet.
///
/// A different session id means a new session started, so printing
/// restarts from the top.  Intermediate snapshots may have been skipped, so
/// the transcript length alone cannot tell.
fn unprinted_lines(snapshot: &ChatSnapshot, cursor: &mut PrintCursor) -> Vec<String> {
    if snapshot.session_id != cursor.session {
        cursor.session = snapshot.session_id;
        cursor.printed = 0;
    }
    let dto = ChatStateDto::from_snapshot(snapshot);
    let start = cursor.printed.min(dto.entries.len());
    let lines = dto.entries[start..].iter().map(format_entry).collect();
    cursor.printed = dto.entries.len();
    lines
}

/// Validates a username locally so the error can be shown straight away.
fn identity_error(candidate: &str) -> Option<String> {
    match chat_core::validate(candidate) {
        Err(e) => Some(e.to_string()),
        Ok(()) if candidate.trim().is_empty() => Some(JoinError::BlankIdentity.to_string()),
        Ok(()) => None,
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed and layered over the config file.
/// 2. `tracing_subscriber` is initialised; `RUST_LOG` wins over the
///    configured level.  Logs go to stderr so they do not interleave with the
///    transcript on stdout.
/// 3. The client is wired to the WebSocket transport and the HTTP roster
///    query, and [`run_event_loop`] is spawned.
/// 4. Stdin lines become [`ClientCommand`]s; snapshot changes are printed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file_config = load_config(cli.config.as_deref()).context("failed to load config")?;
    let config = cli.into_client_config(file_config);
    config.validate().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    info!(
        "Dev Chat client starting: ws={}, roster={}",
        config.server.ws_url, config.server.roster_url
    );

    let transports = Arc::new(WebSocketTransportFactory::new(config.server.ws_url.clone()));
    let roster = Arc::new(HttpRosterFetcher::new(
        config.server.roster_url.clone(),
        config.server.roster_timeout(),
    ));
    let client = ChatClient::new(transports, roster);

    let (commands, command_rx) = mpsc::channel(32);
    let (snapshot_tx, mut snapshots) = watch::channel(ChatSnapshot::default());
    let event_loop = tokio::spawn(run_event_loop(client, command_rx, snapshot_tx));

    match config.client.username {
        Some(name) if identity_error(&name).is_none() => {
            commands.send(ClientCommand::SetIdentity(name)).await?;
            commands.send(ClientCommand::Join).await?;
        }
        _ => println!("Enter a username (at least 4 characters):"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut cursor = PrintCursor::default();
    let mut last_state = SessionState::Idle;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let in_room = matches!(last_state, SessionState::Joined | SessionState::Connecting);
                match parse_input(&line, in_room) {
                    Input::Quit => break,
                    Input::State => {
                        let state = get_chat_state(&snapshots.borrow());
                        println!("{}", serde_json::to_string_pretty(&state)?);
                    }
                    Input::Who => {
                        let roster = snapshots.borrow().roster.clone();
                        println!("Online ({}): {}", roster.len(), roster.join(", "));
                    }
                    Input::Leave => commands.send(ClientCommand::Leave).await?,
                    Input::Identity(candidate) => {
                        let error = identity_error(&candidate);
                        commands.send(ClientCommand::SetIdentity(candidate)).await?;
                        match error {
                            Some(message) => println!("{message}"),
                            None => commands.send(ClientCommand::Join).await?,
                        }
                    }
                    Input::Message(content) => {
                        commands.send(ClientCommand::SendMessage(content)).await?;
                    }
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                for line in unprinted_lines(&snapshot, &mut cursor) {
                    println!("{line}");
                }
                if snapshot.session_state != last_state {
                    match snapshot.session_state {
                        SessionState::Connecting => println!(
                            "Connecting as {}... (/leave to cancel)",
                            snapshot.username.as_deref().unwrap_or_default()
                        ),
                        SessionState::Joined => println!(
                            "Joined as {}. Type /who, /leave or /quit.",
                            snapshot.username.as_deref().unwrap_or_default()
                        ),
                        SessionState::Closed => {
                            println!("Disconnected. Enter a username to join again:")
                        }
                        SessionState::Idle => {}
                    }
                    last_state = snapshot.session_state;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C; leaving");
                break;
            }
        }
    }

    // Shutdown may fail only if the loop already stopped.
    let _ = commands.send(ClientCommand::Shutdown).await;
    drop(commands);
    event_loop.await.context("event loop task failed")?;

    info!("Dev Chat client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::ChatEvent;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        // Arrange: parse with no arguments
        let cli = Cli::parse_from(["chat-client"]);

        // Act
        let config = cli.into_client_config(ClientConfig::default());

        // Assert
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_cli_ws_url_override() {
        let cli = Cli::parse_from(["chat-client", "--ws-url", "ws://127.0.0.1:9000/"]);
        let config = cli.into_client_config(ClientConfig::default());
        assert_eq!(config.server.ws_url, "ws://127.0.0.1:9000/");
    }

    #[test]
    fn test_cli_overrides_file_username_and_level() {
        let mut file = ClientConfig::default();
        file.client.username = Some("fromfile".to_string());

        let cli = Cli::parse_from(["chat-client", "--username", "bobby", "--log-level", "debug"]);
        let config = cli.into_client_config(file);

        assert_eq!(config.client.username.as_deref(), Some("bobby"));
        assert_eq!(config.client.log_level, "debug");
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["chat-client", "--config", "/tmp/chat.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/chat.toml")));
    }

    #[test]
    fn test_lines_before_joining_are_identities() {
        assert_eq!(parse_input("bobby", false), Input::Identity("bobby".to_string()));
        assert_eq!(parse_input("/who", false), Input::Identity("/who".to_string()));
        assert_eq!(parse_input("/quit", false), Input::Quit);
    }

    #[test]
    fn test_lines_in_room_are_messages_or_commands() {
        assert_eq!(parse_input("/who", true), Input::Who);
        assert_eq!(parse_input("/leave", true), Input::Leave);
        assert_eq!(parse_input("/state", true), Input::State);
        assert_eq!(parse_input("  hi  ", true), Input::Message("  hi  ".to_string()));
    }

    #[test]
    fn test_identity_error_messages() {
        assert_eq!(
            identity_error("bob").as_deref(),
            Some("Name must be at least 4 characters long.")
        );
        assert_eq!(identity_error("     ").as_deref(), Some("Name must not be blank."));
        assert_eq!(identity_error("bobby"), None);
    }

    #[test]
    fn test_unprinted_lines_only_returns_new_entries() {
        let mut snapshot = ChatSnapshot {
            session_state: SessionState::Joined,
            session_id: Some(Uuid::new_v4()),
            username: Some("bobby".to_string()),
            transcript: vec![ChatEvent::new("alice", "alice: one")],
            ..ChatSnapshot::default()
        };
        let mut cursor = PrintCursor::default();

        assert_eq!(unprinted_lines(&snapshot, &mut cursor), vec!["alice: one"]);

        snapshot.transcript.push(ChatEvent::new("alice", "alice: two"));
        assert_eq!(unprinted_lines(&snapshot, &mut cursor), vec!["alice: two"]);
        assert!(unprinted_lines(&snapshot, &mut cursor).is_empty());
    }

    #[test]
    fn test_unprinted_lines_restart_after_new_session() {
        let mut cursor = PrintCursor {
            session: Some(Uuid::new_v4()),
            printed: 5,
        };
        let snapshot = ChatSnapshot {
            session_id: Some(Uuid::new_v4()),
            transcript: vec![ChatEvent::new("carol", "carol: fresh")],
            ..ChatSnapshot::default()
        };

        let lines = unprinted_lines(&snapshot, &mut cursor);

        assert_eq!(lines, vec!["carol: fresh"]);
        assert_eq!(cursor.printed, 1);
    }

    #[test]
    fn test_new_session_of_same_length_is_printed_in_full() {
        // Arrange: the empty snapshot between the two sessions was never seen
        let first = ChatSnapshot {
            session_id: Some(Uuid::new_v4()),
            transcript: vec![
                ChatEvent::new("alice", "alice: one"),
                ChatEvent::new("alice", "alice: two"),
            ],
            ..ChatSnapshot::default()
        };
        let second = ChatSnapshot {
            session_id: Some(Uuid::new_v4()),
            transcript: vec![
                ChatEvent::new("carol", "carol: three"),
                ChatEvent::new("carol", "carol: four"),
            ],
            ..ChatSnapshot::default()
        };
        let mut cursor = PrintCursor::default();
        unprinted_lines(&first, &mut cursor);

        // Act
        let lines = unprinted_lines(&second, &mut cursor);

        // Assert
        assert_eq!(lines, vec!["carol: three", "carol: four"]);
    }
}
