//! Response frame
//!
//! Layout:
//! - Byte 0: Status
//! - Bytes 1-4: Body length (LE)
//! - Bytes 5..: Body
//!
//! An `Ok` response with an empty body is meaningful: it signals that the
//! publisher has no root set yet.

use loran_core::{LoranError, LoranResult};

/// Maximum accepted body size in bytes
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Response status codes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
}

impl Status {
    pub fn from_byte(b: u8) -> LoranResult<Self> {
        match b {
            0x00 => Ok(Status::Ok),
            0x01 => Ok(Status::NotFound),
            other => Err(LoranError::UnknownStatus(other)),
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// A single response frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: Vec<u8>,
}

impl Response {
    /// Build an `Ok` response carrying a body (possibly empty)
    pub fn ok(body: Vec<u8>) -> Self {
        Response {
            status: Status::Ok,
            body,
        }
    }

    /// Build a `NotFound` response with an empty body
    pub fn not_found() -> Self {
        Response {
            status: Status::NotFound,
            body: Vec::new(),
        }
    }

    /// Parse a response from a complete frame
    pub fn parse(buf: &[u8]) -> LoranResult<Self> {
        if buf.len() < 5 {
            return Err(LoranError::BufferTooShort {
                expected: 5,
                actual: buf.len(),
            });
        }

        let status = Status::from_byte(buf[0])?;
        let body_len = u32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]) as usize;

        if body_len > MAX_BODY_SIZE {
            return Err(LoranError::InvalidWireFormat(format!(
                "Body too large: {} > {}",
                body_len, MAX_BODY_SIZE
            )));
        }
        if buf.len() != 5 + body_len {
            return Err(LoranError::InvalidWireFormat(format!(
                "Response length mismatch: header says {}, frame has {}",
                5 + body_len,
                buf.len()
            )));
        }

        Ok(Response {
            status,
            body: buf[5..].to_vec(),
        })
    }

    /// Serialize the response to a complete frame
    pub fn serialize(&self) -> LoranResult<Vec<u8>> {
        if self.body.len() > MAX_BODY_SIZE {
            return Err(LoranError::InvalidWireFormat(format!(
                "Body too large: {} > {}",
                self.body.len(),
                MAX_BODY_SIZE
            )));
        }

        let mut buf = Vec::with_capacity(5 + self.body.len());
        buf.push(self.status.to_byte());
        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_roundtrip() {
        let resp = Response::ok(b"r1-55-abcd".to_vec());
        let bytes = resp.serialize().unwrap();
        assert_eq!(Response::parse(&bytes).unwrap(), resp);
    }

    #[test]
    fn test_empty_body_roundtrip() {
        let resp = Response::ok(Vec::new());
        let bytes = resp.serialize().unwrap();
        let parsed = Response::parse(&bytes).unwrap();
        assert_eq!(parsed.status, Status::Ok);
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn test_not_found_roundtrip() {
        let bytes = Response::not_found().serialize().unwrap();
        let parsed = Response::parse(&bytes).unwrap();
        assert_eq!(parsed.status, Status::NotFound);
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut bytes = Response::ok(Vec::new()).serialize().unwrap();
        bytes[0] = 0x42;
        assert!(matches!(
            Response::parse(&bytes),
            Err(LoranError::UnknownStatus(0x42))
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut bytes = Response::ok(b"abc".to_vec()).serialize().unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(Response::parse(&bytes).is_err());
    }
}
