//! Identity types for the LORAN head protocol
//!
//! A peer id is an opaque 64-bit token: wide enough that two hosts in the
//! same deployment will not collide by accident, and small enough to key
//! an address book cheaply. Cryptographic identity belongs to the
//! embedding host layer, not to this crate.

use std::fmt;

use rand::Rng;

/// Peer identity - opaque 64-bit host identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PeerId(pub u64);

impl PeerId {
    pub const ZERO: PeerId = PeerId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        PeerId(id)
    }

    /// Generate a fresh random identity
    pub fn generate() -> Self {
        PeerId(rand::thread_rng().gen())
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        PeerId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peer({:016x})", self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_roundtrip() {
        let id = PeerId::new(0xDEADBEEF_CAFEBABE);
        let bytes = id.to_bytes();
        let recovered = PeerId::from_bytes(bytes);
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_peer_id_generate_distinct() {
        assert_ne!(PeerId::generate(), PeerId::generate());
    }
}
