//! Byte-stream channel between two hosts

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use loran_core::{LoranError, LoranResult};

/// Maximum length-framed message accepted on a channel
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// A bidirectional byte-stream channel, addressed by protocol identifier
/// at open time. Messages are length-framed (u32 LE prefix).
#[derive(Debug)]
pub struct Channel {
    stream: TcpStream,
    remote_addr: SocketAddr,
}

impl Channel {
    pub(crate) fn new(stream: TcpStream, remote_addr: SocketAddr) -> Self {
        Channel {
            stream,
            remote_addr,
        }
    }

    /// Remote endpoint address
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Send one length-framed message
    pub async fn send(&mut self, bytes: &[u8]) -> LoranResult<()> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(LoranError::InvalidWireFormat(format!(
                "Message too large: {} > {}",
                bytes.len(),
                MAX_MESSAGE_SIZE
            )));
        }

        self.stream
            .write_all(&(bytes.len() as u32).to_le_bytes())
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;
        self.stream
            .write_all(bytes)
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;
        self.stream
            .flush()
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;
        Ok(())
    }

    /// Receive one length-framed message, reading it to completion
    pub async fn recv(&mut self) -> LoranResult<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(LoranError::InvalidWireFormat(format!(
                "Message too large: {} > {}",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;
        Ok(buf)
    }

    /// Shut down the write side, signalling end of exchange to the peer
    pub async fn shutdown(&mut self) -> LoranResult<()> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))
    }
}
