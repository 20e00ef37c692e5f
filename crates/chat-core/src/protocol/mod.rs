//! Protocol module containing the JSON frame types and the frame codec.

pub mod codec;
pub mod frames;

pub use codec::{decode_frame, decode_roster_response, encode_frame, ProtocolError};
pub use frames::*;
