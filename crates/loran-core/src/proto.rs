//! Protocol identifier type
//!
//! A protocol id addresses one logical channel on the shared transport.
//! Both endpoints must derive the identical token from the identical topic
//! string to rendezvous; derivation lives in `loran-head`.

use std::fmt;

/// Derived protocol channel identifier
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProtocolId(String);

impl ProtocolId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        ProtocolId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Protocol({})", self.0)
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProtocolId {
    fn from(s: &str) -> Self {
        ProtocolId(s.to_string())
    }
}
