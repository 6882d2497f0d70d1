//! LORAN Head Protocol - Publish and discover a dataset's current root
//!
//! One publisher per topic holds the current root identifier behind a
//! reader/writer lock and serves it to anyone who asks:
//! - `Publisher` - serve, update, close
//! - `query_root_cid` - one synchronous round trip from a remote host
//! - `derive_protocol_id` - topic to channel identifier, shared by both sides
//!
//! Discovery is polling only; there is no push notification of updates.

pub mod client;
pub mod protocol;
pub mod publisher;

pub use client::*;
pub use protocol::*;
pub use publisher::*;
