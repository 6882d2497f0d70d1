//! LORAN Transport Layer - Protocol-addressed stream channels
//!
//! This crate provides:
//! - Host identity and peer address book
//! - Listening for channels by protocol identifier
//! - Dialing a remote peer on a protocol identifier
//!
//! A channel is a plain bidirectional byte stream; the protocol identifier
//! is exchanged once in a preamble when the channel is opened, so multiple
//! logical protocols share one listening socket per host.

pub mod channel;
pub mod host;

pub use channel::*;
pub use host::*;
