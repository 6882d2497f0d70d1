//! LORAN Wire Protocol - Binary frame format for head exchanges
//!
//! This crate implements the request/response frames carried over a
//! protocol-addressed channel:
//! - Request: method + path
//! - Response: status + length-prefixed body
//!
//! One request frame and one response frame per channel; no pipelining.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
