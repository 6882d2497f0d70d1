//! Error types for the LORAN head protocol

use thiserror::Error;

use crate::{PeerId, ProtocolId};

/// Core LORAN errors
#[derive(Error, Debug)]
pub enum LoranError {
    // Cid errors
    #[error("Invalid cid text: {0}")]
    InvalidCid(String),

    #[error("Digest length mismatch: expected {expected}, got {actual}")]
    DigestLength { expected: usize, actual: usize },

    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown request method: {0}")]
    UnknownMethod(u8),

    #[error("Unknown response status: {0}")]
    UnknownStatus(u8),

    // Head protocol errors
    #[error("Remote publisher does not serve the requested path")]
    HeadNotFound,

    // Transport errors
    #[error("No known address for peer {0}")]
    UnknownPeer(PeerId),

    #[error("Remote host rejected protocol {0}")]
    ProtocolRejected(ProtocolId),

    #[error("Listener closed")]
    ListenerClosed,

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for LORAN operations
pub type LoranResult<T> = Result<T, LoranError>;
