//! LORAN Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the LORAN head protocol:
//! - Identifiers (PeerId, ProtocolId)
//! - Content-addressed root references (RootCid)
//! - Error types

pub mod cid;
pub mod error;
pub mod id;
pub mod proto;

pub use cid::*;
pub use error::*;
pub use id::*;
pub use proto::*;
