//! Request frame
//!
//! Layout:
//! - Byte 0: Method
//! - Bytes 1-2: Path length (LE)
//! - Bytes 3..: Path (UTF-8)

use loran_core::{LoranError, LoranResult};

/// Maximum accepted path length in bytes
pub const MAX_PATH_LEN: usize = 1024;

/// Request methods
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Method {
    /// Fetch a resource; the only method the head protocol defines
    Get = 0x01,
}

impl Method {
    pub fn from_byte(b: u8) -> LoranResult<Self> {
        match b {
            0x01 => Ok(Method::Get),
            other => Err(LoranError::UnknownMethod(other)),
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// A single request frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
}

impl Request {
    /// Build a GET request for a resource path
    pub fn get(path: impl Into<String>) -> Self {
        Request {
            method: Method::Get,
            path: path.into(),
        }
    }

    /// Parse a request from a complete frame
    pub fn parse(buf: &[u8]) -> LoranResult<Self> {
        if buf.len() < 3 {
            return Err(LoranError::BufferTooShort {
                expected: 3,
                actual: buf.len(),
            });
        }

        let method = Method::from_byte(buf[0])?;
        let path_len = u16::from_le_bytes([buf[1], buf[2]]) as usize;

        if path_len > MAX_PATH_LEN {
            return Err(LoranError::InvalidWireFormat(format!(
                "Path too long: {} > {}",
                path_len, MAX_PATH_LEN
            )));
        }
        if buf.len() != 3 + path_len {
            return Err(LoranError::InvalidWireFormat(format!(
                "Request length mismatch: header says {}, frame has {}",
                3 + path_len,
                buf.len()
            )));
        }

        let path = std::str::from_utf8(&buf[3..])
            .map_err(|_| LoranError::InvalidWireFormat("Path is not UTF-8".into()))?
            .to_string();

        Ok(Request { method, path })
    }

    /// Serialize the request to a complete frame
    pub fn serialize(&self) -> LoranResult<Vec<u8>> {
        let path = self.path.as_bytes();
        if path.len() > MAX_PATH_LEN {
            return Err(LoranError::InvalidWireFormat(format!(
                "Path too long: {} > {}",
                path.len(),
                MAX_PATH_LEN
            )));
        }

        let mut buf = Vec::with_capacity(3 + path.len());
        buf.push(self.method.to_byte());
        buf.extend_from_slice(&(path.len() as u16).to_le_bytes());
        buf.extend_from_slice(path);
        Ok(buf)
    }
}
