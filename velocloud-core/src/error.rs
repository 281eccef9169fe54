//! Error types for packet parsing

use thiserror::Error;

/// Errors that can occur when parsing sensor packets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Datagram is not exactly one data packet long
    #[error("Wrong packet size: expected {expected} bytes, got {actual}")]
    WrongPacketSize { expected: usize, actual: usize },

    /// Slice is too short to contain the requested structure
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Data block does not start with the firing-sequence marker
    #[error("Invalid block header at block {index}: got {actual:02X?}")]
    InvalidBlockHeader { index: usize, actual: [u8; 2] },

    /// Failed to deserialize packet structure
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

impl From<bincode::Error> for ParseError {
    fn from(e: bincode::Error) -> Self {
        ParseError::DeserializationFailed(e.to_string())
    }
}
