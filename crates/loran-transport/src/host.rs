//! Host layer - identity, address book, and protocol-addressed listen/dial
//!
//! One TCP listening socket per host carries every protocol. The dialing
//! side opens a connection and writes a preamble naming the protocol
//! identifier; the accepting side routes the stream to whichever listener
//! registered that identifier, or rejects it with a single status byte.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use loran_core::{LoranError, LoranResult, PeerId, ProtocolId};

use crate::Channel;

/// Maximum accepted protocol identifier length in the preamble
pub const MAX_PROTOCOL_ID_LEN: usize = 512;

/// Time allowed for the dialing side to complete the preamble exchange
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Inbound channels buffered per listener before accepts back-pressure dials
const LISTEN_BACKLOG: usize = 64;

const ACK_ROUTED: u8 = 0x01;
const ACK_REJECTED: u8 = 0x00;

struct HostInner {
    id: PeerId,
    local_addr: SocketAddr,
    /// Address book: peer identity to transport address
    peers: RwLock<HashMap<PeerId, SocketAddr>>,
    /// Registered listeners, keyed by protocol identifier
    protocols: RwLock<HashMap<String, mpsc::Sender<Channel>>>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for HostInner {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.lock().take() {
            task.abort();
        }
    }
}

/// A network host: one identity, one listening socket, many protocols
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

impl Host {
    /// Bind to a local address with a freshly generated identity
    pub async fn bind(addr: SocketAddr) -> LoranResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| LoranError::Transport(e.to_string()))?;

        let inner = Arc::new(HostInner {
            id: PeerId::generate(),
            local_addr,
            peers: RwLock::new(HashMap::new()),
            protocols: RwLock::new(HashMap::new()),
            accept_task: Mutex::new(None),
        });

        let task = tokio::spawn(accept_loop(listener, Arc::downgrade(&inner)));
        *inner.accept_task.lock() = Some(task);

        tracing::debug!(host = %inner.id, addr = %local_addr, "Host bound");
        Ok(Host { inner })
    }

    /// This host's identity
    pub fn id(&self) -> PeerId {
        self.inner.id
    }

    /// Address the listening socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Record a peer's transport address in the address book
    pub fn add_address(&self, peer: PeerId, addr: SocketAddr) {
        self.inner.peers.write().insert(peer, addr);
    }

    /// Register a listener for a protocol identifier
    pub fn listen(&self, protocol: &ProtocolId) -> LoranResult<Listener> {
        let mut protocols = self.inner.protocols.write();
        if protocols.contains_key(protocol.as_str()) {
            return Err(LoranError::Transport(format!(
                "Already listening on {protocol}"
            )));
        }

        let (tx, rx) = mpsc::channel(LISTEN_BACKLOG);
        protocols.insert(protocol.as_str().to_string(), tx);

        Ok(Listener {
            protocol: protocol.clone(),
            rx,
            host: Arc::downgrade(&self.inner),
        })
    }

    /// Open a channel to a known peer on a protocol identifier
    ///
    /// The peer's address must already be in the address book. The returned
    /// channel is transient: one exchange, then dropped. Cancelling the
    /// future drops the half-open connection.
    pub async fn dial(&self, peer: PeerId, protocol: &ProtocolId) -> LoranResult<Channel> {
        let addr = self
            .inner
            .peers
            .read()
            .get(&peer)
            .copied()
            .ok_or(LoranError::UnknownPeer(peer))?;

        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;

        write_preamble(&mut stream, protocol).await?;

        let mut ack = [0u8; 1];
        stream
            .read_exact(&mut ack)
            .await
            .map_err(|e| LoranError::Transport(e.to_string()))?;
        if ack[0] != ACK_ROUTED {
            return Err(LoranError::ProtocolRejected(protocol.clone()));
        }

        Ok(Channel::new(stream, addr))
    }

    /// Stop accepting inbound channels and close every listener
    pub fn close(&self) {
        if let Some(task) = self.inner.accept_task.lock().take() {
            task.abort();
        }
        self.inner.protocols.write().clear();
        tracing::debug!(host = %self.inner.id, "Host closed");
    }
}

/// Accepts inbound channels for one protocol identifier
pub struct Listener {
    protocol: ProtocolId,
    rx: mpsc::Receiver<Channel>,
    host: Weak<HostInner>,
}

impl Listener {
    /// Protocol identifier this listener is bound to
    pub fn protocol(&self) -> &ProtocolId {
        &self.protocol
    }

    /// Wait for the next inbound channel
    ///
    /// Returns `ListenerClosed` once the host is closed or dropped.
    pub async fn accept(&mut self) -> LoranResult<Channel> {
        self.rx.recv().await.ok_or(LoranError::ListenerClosed)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(host) = self.host.upgrade() {
            host.protocols.write().remove(self.protocol.as_str());
        }
    }
}

async fn accept_loop(listener: TcpListener, inner: Weak<HostInner>) {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Accept error: {}", e);
                continue;
            }
        };

        let Some(inner) = inner.upgrade() else {
            return;
        };
        tokio::spawn(route_channel(stream, addr, inner));
    }
}

/// Read the dialer's preamble and hand the stream to the matching listener
async fn route_channel(mut stream: TcpStream, addr: SocketAddr, inner: Arc<HostInner>) {
    let protocol = match timeout(HANDSHAKE_TIMEOUT, read_preamble(&mut stream)).await {
        Ok(Ok(pid)) => pid,
        Ok(Err(e)) => {
            tracing::debug!(remote = %addr, "Bad preamble: {}", e);
            return;
        }
        Err(_) => {
            tracing::debug!(remote = %addr, "Preamble timed out");
            return;
        }
    };

    let sender = inner.protocols.read().get(protocol.as_str()).cloned();
    match sender {
        Some(tx) => {
            if stream.write_all(&[ACK_ROUTED]).await.is_err() {
                return;
            }
            if tx.send(Channel::new(stream, addr)).await.is_err() {
                tracing::debug!(protocol = %protocol, "Listener gone, dropping channel");
            }
        }
        None => {
            tracing::debug!(protocol = %protocol, remote = %addr, "No listener, rejecting");
            let _ = stream.write_all(&[ACK_REJECTED]).await;
        }
    }
}

async fn write_preamble(stream: &mut TcpStream, protocol: &ProtocolId) -> LoranResult<()> {
    let pid = protocol.as_bytes();
    if pid.len() > MAX_PROTOCOL_ID_LEN {
        return Err(LoranError::InvalidWireFormat(format!(
            "Protocol id too long: {} > {}",
            pid.len(),
            MAX_PROTOCOL_ID_LEN
        )));
    }

    stream
        .write_all(&(pid.len() as u16).to_le_bytes())
        .await
        .map_err(|e| LoranError::Transport(e.to_string()))?;
    stream
        .write_all(pid)
        .await
        .map_err(|e| LoranError::Transport(e.to_string()))?;
    Ok(())
}

async fn read_preamble(stream: &mut TcpStream) -> LoranResult<ProtocolId> {
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| LoranError::Transport(e.to_string()))?;

    let len = u16::from_le_bytes(len_buf) as usize;
    if len == 0 || len > MAX_PROTOCOL_ID_LEN {
        return Err(LoranError::InvalidWireFormat(format!(
            "Protocol id length out of range: {}",
            len
        )));
    }

    let mut buf = vec![0u8; len];
    stream
        .read_exact(&mut buf)
        .await
        .map_err(|e| LoranError::Transport(e.to_string()))?;

    let pid = String::from_utf8(buf)
        .map_err(|_| LoranError::InvalidWireFormat("Protocol id is not UTF-8".into()))?;
    Ok(ProtocolId::new(pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    fn connect_hosts(a: &Host, b: &Host) {
        a.add_address(b.id(), b.local_addr());
        b.add_address(a.id(), a.local_addr());
    }

    #[tokio::test]
    async fn test_bind_assigns_port() {
        let host = Host::bind(loopback()).await.unwrap();
        assert_ne!(host.local_addr().port(), 0);
        assert_ne!(host.id(), PeerId::ZERO);
    }

    #[tokio::test]
    async fn test_dial_unknown_peer() {
        let host = Host::bind(loopback()).await.unwrap();
        let err = host
            .dial(PeerId::new(42), &ProtocolId::from("/test/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoranError::UnknownPeer(_)));
    }

    #[tokio::test]
    async fn test_listen_dial_exchange() {
        let server = Host::bind(loopback()).await.unwrap();
        let client = Host::bind(loopback()).await.unwrap();
        connect_hosts(&server, &client);

        let pid = ProtocolId::from("/test/exchange/1");
        let mut listener = server.listen(&pid).unwrap();

        let server_side = tokio::spawn(async move {
            let mut ch = listener.accept().await.unwrap();
            let msg = ch.recv().await.unwrap();
            ch.send(&msg).await.unwrap();
        });

        let mut ch = client.dial(server.id(), &pid).await.unwrap();
        ch.send(b"ping").await.unwrap();
        let echoed = ch.recv().await.unwrap();
        assert_eq!(echoed, b"ping");

        server_side.await.unwrap();
    }

    #[tokio::test]
    async fn test_unregistered_protocol_rejected() {
        let server = Host::bind(loopback()).await.unwrap();
        let client = Host::bind(loopback()).await.unwrap();
        connect_hosts(&server, &client);

        let err = client
            .dial(server.id(), &ProtocolId::from("/test/nobody-home/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoranError::ProtocolRejected(_)));
    }

    #[tokio::test]
    async fn test_double_listen_rejected() {
        let host = Host::bind(loopback()).await.unwrap();
        let pid = ProtocolId::from("/test/dup/1");
        let _listener = host.listen(&pid).unwrap();
        assert!(host.listen(&pid).is_err());
    }

    #[tokio::test]
    async fn test_listener_slot_freed_on_drop() {
        let host = Host::bind(loopback()).await.unwrap();
        let pid = ProtocolId::from("/test/redo/1");
        drop(host.listen(&pid).unwrap());
        assert!(host.listen(&pid).is_ok());
    }

    #[tokio::test]
    async fn test_close_wakes_listener() {
        let host = Host::bind(loopback()).await.unwrap();
        let mut listener = host.listen(&ProtocolId::from("/test/close/1")).unwrap();

        host.close();

        let err = listener.accept().await.unwrap_err();
        assert!(matches!(err, LoranError::ListenerClosed));
    }
}
