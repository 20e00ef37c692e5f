//! WebSocket transport.
//!
//! [`WebSocketTransportFactory`] opens one `ws://` or `wss://` connection per
//! session using `tokio_tungstenite::connect_async`.  The resulting
//! [`WebSocketTransport`] carries text frames only:
//!
//! | Inbound message | Handling                                   |
//! |-----------------|--------------------------------------------|
//! | `Text`          | delivered as [`Incoming::Text`]            |
//! | `Binary`        | delivered as [`Incoming::Unreadable`]      |
//! | `Ping`/`Pong`   | skipped (tungstenite answers pings itself) |
//! | `Close`         | end of stream                              |
//!
//! # Cancel safety
//!
//! `recv` only awaits `StreamExt::next` on the socket, which does not lose
//! messages when the future is dropped, so the client can poll it inside
//! `tokio::select!`.

pub mod mock;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

use crate::application::session::{Incoming, Transport, TransportError, TransportFactory};

/// Opens WebSocket connections to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketTransportFactory {
    url: String,
}

impl WebSocketTransportFactory {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransportFactory for WebSocketTransportFactory {
    async fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        let (stream, response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| TransportError::Open {
                    endpoint: self.url.clone(),
                    reason: e.to_string(),
                })?;
        debug!(
            "websocket handshake with {} completed (HTTP {})",
            self.url,
            response.status()
        );
        Ok(Box::new(WebSocketTransport { stream }))
    }
}

/// A live WebSocket connection.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<Incoming, TransportError>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(msg) => msg,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            };

            match msg {
                WsMessage::Text(text) => return Some(Ok(Incoming::Text(text))),
                WsMessage::Binary(data) => {
                    return Some(Ok(Incoming::Unreadable(format!(
                        "binary frame, {} bytes",
                        data.len()
                    ))))
                }
                WsMessage::Close(_) => return None,
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("websocket close: {e}");
        }
    }
}
