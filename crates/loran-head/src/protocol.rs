//! Protocol identifier derivation
//!
//! Publisher and client must derive a byte-identical token from the same
//! topic string to rendezvous on the same channel. Bumping the version tag
//! is the mechanism for incompatible changes: old and new builds simply
//! fail to rendezvous instead of mis-parsing each other's frames.

use loran_core::ProtocolId;

/// The single resource path the head protocol serves
pub const HEAD_PATH: &str = "head";

const PROTOCOL_NAMESPACE: &str = "loran";
const PROTOCOL_VERSION: &str = "0.0.1";

/// Derive the channel identifier for a topic
pub fn derive_protocol_id(topic: &str) -> ProtocolId {
    ProtocolId::new(format!(
        "/{PROTOCOL_NAMESPACE}/head/{topic}/{PROTOCOL_VERSION}"
    ))
}
