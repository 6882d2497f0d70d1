//! Content-addressed root references
//!
//! A `RootCid` names one version of a published dataset. It is
//! self-describing: a codec byte tags how the addressed bytes are encoded,
//! and a sha2-256 digest makes the reference content-addressed.
//!
//! Text form: `r1-<codec:2 hex>-<digest:64 hex>`.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::{LoranError, LoranResult};

/// Digest width in bytes (sha2-256)
pub const DIGEST_SIZE: usize = 32;

/// Codec tag for raw, uninterpreted bytes
pub const CODEC_RAW: u8 = 0x55;

/// Text form prefix, bumped on incompatible format changes
const TEXT_PREFIX: &str = "r1";

/// Content-addressed root identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootCid {
    codec: u8,
    digest: [u8; DIGEST_SIZE],
}

impl RootCid {
    /// The unset sentinel: "no root has ever been published".
    ///
    /// Distinct from every identifier produced by [`RootCid::from_data`];
    /// it has no text form and is represented on the wire by an empty body.
    pub const UNSET: RootCid = RootCid {
        codec: 0,
        digest: [0u8; DIGEST_SIZE],
    };

    /// Build an identifier from a codec tag and an already-computed digest
    pub fn new(codec: u8, digest: [u8; DIGEST_SIZE]) -> Self {
        RootCid { codec, digest }
    }

    /// Compute the identifier for a payload
    pub fn from_data(codec: u8, data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        RootCid {
            codec,
            digest: digest.into(),
        }
    }

    #[inline]
    pub fn is_unset(&self) -> bool {
        *self == RootCid::UNSET
    }

    #[inline]
    pub fn codec(&self) -> u8 {
        self.codec
    }

    #[inline]
    pub fn digest(&self) -> &[u8; DIGEST_SIZE] {
        &self.digest
    }
}

impl fmt::Display for RootCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02x}-{}",
            TEXT_PREFIX,
            self.codec,
            hex::encode(self.digest)
        )
    }
}

impl fmt::Debug for RootCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            write!(f, "RootCid(unset)")
        } else {
            write!(f, "RootCid({})", self)
        }
    }
}

impl FromStr for RootCid {
    type Err = LoranError;

    fn from_str(s: &str) -> LoranResult<Self> {
        let mut parts = s.split('-');
        let (prefix, codec_hex, digest_hex) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(p), Some(c), Some(d), None) => (p, c, d),
                _ => return Err(LoranError::InvalidCid(s.to_string())),
            };

        if prefix != TEXT_PREFIX || codec_hex.len() != 2 {
            return Err(LoranError::InvalidCid(s.to_string()));
        }

        let codec_byte = hex::decode(codec_hex)
            .map_err(|_| LoranError::InvalidCid(s.to_string()))?;
        let digest_bytes = hex::decode(digest_hex)
            .map_err(|_| LoranError::InvalidCid(s.to_string()))?;

        if digest_bytes.len() != DIGEST_SIZE {
            return Err(LoranError::DigestLength {
                expected: DIGEST_SIZE,
                actual: digest_bytes.len(),
            });
        }

        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&digest_bytes);

        let cid = RootCid {
            codec: codec_byte[0],
            digest,
        };

        // The sentinel has no text form; only set identifiers travel as text.
        if cid.is_unset() {
            return Err(LoranError::InvalidCid(s.to_string()));
        }

        Ok(cid)
    }
}
