//! JSON codec for the room connection and the roster endpoint.
//!
//! Inbound dispatch rule:
//! ```text
//! "type" == "connected-users"  →  InboundFrame::Roster(connectedUsers)
//! anything else                →  InboundFrame::Chat({username, message})
//! ```
//!
//! A payload that is not JSON, or that matches neither shape, is reported
//! as a [`ProtocolError`].  Callers drop such frames and keep going; one bad
//! frame never affects the frames after it.

use serde::de::Error as _;
use serde_json::Value;
use thiserror::Error;

use crate::protocol::frames::{
    ChatEvent, InboundFrame, OutboundFrame, RosterResponse, ROSTER_FRAME_TYPE,
};

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload is not valid JSON.
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The payload is JSON but does not have the expected fields.
    #[error("payload is not a valid {expected}: {source}")]
    UnexpectedShape {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An outbound frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one inbound text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] when `text` is not JSON and
/// [`ProtocolError::UnexpectedShape`] when it is JSON but neither a roster
/// frame nor a chat event.
///
/// # Examples
///
/// ```rust
/// use chat_core::protocol::{decode_frame, InboundFrame};
///
/// let frame = decode_frame(r#"{"type":"connected-users","connectedUsers":["bobby"]}"#).unwrap();
/// assert_eq!(frame, InboundFrame::Roster(vec!["bobby".to_string()]));
/// ```
pub fn decode_frame(text: &str) -> Result<InboundFrame, ProtocolError> {
    let value: Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

    if is_roster_frame(&value) {
        let payload: RosterResponse =
            serde_json::from_value(value).map_err(|source| ProtocolError::UnexpectedShape {
                expected: "roster frame",
                source,
            })?;
        return Ok(InboundFrame::Roster(payload.connected_users));
    }

    let value = require_object(value, "chat event")?;
    let event: ChatEvent =
        serde_json::from_value(value).map_err(|source| ProtocolError::UnexpectedShape {
            expected: "chat event",
            source,
        })?;
    Ok(InboundFrame::Chat(event))
}

/// Serializes an outbound frame to the JSON text sent on the wire.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_frame(frame: &OutboundFrame) -> Result<String, ProtocolError> {
    serde_json::to_string(frame).map_err(ProtocolError::Encode)
}

/// Decodes the body returned by the one-shot roster query.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the body is not a `{"connectedUsers": [...]}`
/// object.
pub fn decode_roster_response(body: &str) -> Result<Vec<String>, ProtocolError> {
    let value: Value = serde_json::from_str(body).map_err(ProtocolError::Malformed)?;
    let value = require_object(value, "roster response")?;
    let payload: RosterResponse =
        serde_json::from_value(value).map_err(|source| ProtocolError::UnexpectedShape {
            expected: "roster response",
            source,
        })?;
    Ok(payload.connected_users)
}

/// serde would otherwise fill a struct from a JSON array positionally.
fn require_object(value: Value, expected: &'static str) -> Result<Value, ProtocolError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(ProtocolError::UnexpectedShape {
            expected,
            source: serde_json::Error::custom("expected a JSON object"),
        })
    }
}

fn is_roster_frame(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some(ROSTER_FRAME_TYPE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
