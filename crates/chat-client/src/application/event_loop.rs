//! The client event loop.
//!
//! One task owns the [`ChatClient`] and is the only writer to its state.  It
//! selects over two sources, strictly one event at a time:
//!
//! ```text
//!   renderer ── ClientCommand ──> mpsc ──┐
//!                                        ├─ select! ─> ChatClient ─> watch<ChatSnapshot> ─> renderer
//!   handshake, roster queries, frames ───┘
//! ```
//!
//! After each processed event the loop publishes a fresh [`ChatSnapshot`].
//! Renderers only ever read snapshots; they never touch the client directly.
//!
//! No command waits on the network.  A join publishes `Connecting` at once
//! and the handshake completes through the second branch, so `Leave` and
//! `Shutdown` are handled even while a server never answers.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::application::chat_client::{ChatClient, ChatSnapshot, ClientUpdate};
use crate::application::session::SendOutcome;

/// A user intent sent from the renderer to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    SetIdentity(String),
    Join,
    SendMessage(String),
    Leave,
    /// Leave the room and stop the loop.
    Shutdown,
}

/// Runs the client until a [`ClientCommand::Shutdown`] arrives or every
/// command sender has been dropped.
///
/// A roster query is started once on load.  On exit the session (or a
/// pending handshake) is closed and a final snapshot is published.  The
/// client is handed back so the caller can inspect it.
pub async fn run_event_loop(
    mut client: ChatClient,
    mut commands: mpsc::Receiver<ClientCommand>,
    snapshots: watch::Sender<ChatSnapshot>,
) -> ChatClient {
    client.request_roster_refresh();
    snapshots.send_replace(client.snapshot());

    loop {
        let busy = client.has_pending_updates();

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("command channel closed");
                    break;
                };
                if !handle_command(&mut client, command).await {
                    break;
                }
            }
            Some(update) = client.next_update(), if busy => match update {
                ClientUpdate::SessionClosed => info!("disconnected; rejoin required"),
                other => debug!("applied {other:?}"),
            },
        }

        snapshots.send_replace(client.snapshot());
    }

    client.leave().await;
    snapshots.send_replace(client.snapshot());
    client
}

/// Applies one command.  Returns `false` when the loop should stop.
async fn handle_command(client: &mut ChatClient, command: ClientCommand) -> bool {
    match command {
        ClientCommand::SetIdentity(candidate) => client.set_identity(candidate),
        ClientCommand::Join => match client.begin_join().await {
            Ok(()) => debug!("join started"),
            Err(e) => info!("join refused: {e}"),
        },
        ClientCommand::SendMessage(content) => {
            let outcome = client.send_message(&content).await;
            if outcome != SendOutcome::Sent {
                debug!("message not sent: {outcome:?}");
            }
        }
        ClientCommand::Leave => client.leave().await,
        ClientCommand::Shutdown => return false,
    }
    true
}

// ── Tests ─────────────────────────────────────────────────────────────────────
