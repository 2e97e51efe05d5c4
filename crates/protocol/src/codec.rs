//! Binary codec for network messages.

use crate::GameMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Encode a message to bytes.
pub fn encode(message: &GameMessage) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(message, bincode::config::standard())?)
}

/// Decode a message from bytes.
pub fn decode(data: &[u8]) -> Result<GameMessage, CodecError> {
    let (message, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(message)
}
