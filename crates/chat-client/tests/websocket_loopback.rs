//! End-to-end test of the WebSocket transport against a local
//! `tokio-tungstenite` server that plays the chat backend.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

use chat_client::application::roster::{FetchError, RosterFetcher};
use chat_client::infrastructure::transport::WebSocketTransportFactory;
use chat_client::infrastructure::ui_bridge::{ChatStateDto, EntryKind};
use chat_client::{ChatClient, ClientUpdate, SendOutcome, SessionState};

struct NoRoster;

#[async_trait]
impl RosterFetcher for NoRoster {
    async fn fetch_roster(&self) -> Result<Vec<String>, FetchError> {
        Err(FetchError::Unreachable("not under test".to_string()))
    }
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text,
            Some(Ok(_)) => continue,
            other => panic!("server expected a text frame, got {other:?}"),
        }
    }
}

/// Next update that is not the (always failing) background roster query.
async fn next_room_update(client: &mut ChatClient) -> Option<ClientUpdate> {
    loop {
        match client.next_update().await {
            Some(ClientUpdate::RosterRefreshFailed) => continue,
            other => return other,
        }
    }
}

/// Accepts one client, plays a short scripted conversation, and returns the
/// text frames the client sent.
async fn scripted_server(listener: TcpListener) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    let mut received = Vec::new();

    received.push(next_text(&mut ws).await);
    ws.send(Message::Text(
        r#"{"type":"connected-users","connectedUsers":["alice","bobby"]}"#.to_string(),
    ))
    .await
    .unwrap();
    ws.send(Message::Text(
        r#"{"username":"bobby","message":"bobby has joined the chat"}"#.to_string(),
    ))
    .await
    .unwrap();

    received.push(next_text(&mut ws).await);
    ws.send(Message::Binary(vec![0xde, 0xad])).await.unwrap();
    ws.send(Message::Text("not json".to_string())).await.unwrap();
    ws.send(Message::Text(
        r#"{"username":"bobby","message":"bobby: hello: world"}"#.to_string(),
    ))
    .await
    .unwrap();

    ws.close(None).await.unwrap();
    while let Some(Ok(_)) = ws.next().await {}
    received
}

#[tokio::test]
async fn test_full_conversation_over_real_websocket() {
    // Arrange
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(scripted_server(listener));

    let factory = Arc::new(WebSocketTransportFactory::new(format!("ws://{addr}/")));
    let mut client = ChatClient::new(factory, Arc::new(NoRoster));
    client.set_identity("bobby");

    // Act + Assert: join
    assert_eq!(client.join().await, Ok(SessionState::Joined));
    assert_eq!(next_room_update(&mut client).await, Some(ClientUpdate::RosterReplaced));
    assert_eq!(next_room_update(&mut client).await, Some(ClientUpdate::MessageAppended));

    // Send; the failing roster query must not stop the message
    assert_eq!(client.send_message("hello: world").await, SendOutcome::Sent);

    // The binary and garbage frames are skipped, the echo is appended
    assert_eq!(next_room_update(&mut client).await, Some(ClientUpdate::MessageAppended));
    assert_eq!(next_room_update(&mut client).await, Some(ClientUpdate::SessionClosed));
    assert_eq!(client.session_state(), SessionState::Closed);

    let sent = server.await.unwrap();
    assert_eq!(
        sent,
        vec![
            r#"{"type":"join","username":"bobby"}"#.to_string(),
            r#"{"type":"message","content":"hello: world"}"#.to_string(),
        ]
    );

    let dto = ChatStateDto::from_snapshot(&client.snapshot());
    assert_eq!(dto.roster, vec!["alice", "bobby"]);
    assert_eq!(dto.entries.len(), 2);
    assert_eq!(dto.entries[0].kind, EntryKind::Joined);
    assert_eq!(dto.entries[1].display_name, "bobby");
    assert_eq!(dto.entries[1].content, "hello: world");
    assert!(dto.entries[1].is_own);
}

#[tokio::test]
async fn test_unreachable_server_ends_closed_without_frames() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let factory = Arc::new(WebSocketTransportFactory::new(format!("ws://{addr}/")));
    let mut client = ChatClient::new(factory, Arc::new(NoRoster));
    client.set_identity("bobby");

    let state = client.join().await;

    assert_eq!(state, Ok(SessionState::Closed));
    assert_eq!(client.send_message("anyone?").await, SendOutcome::NotJoined);
}
