//! Head publisher - owns and serves one topic's current root identifier

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;

use loran_core::{LoranError, LoranResult, RootCid};
use loran_transport::{Channel, Host};
use loran_wire::{Request, Response};

use crate::{derive_protocol_id, HEAD_PATH};

/// Grace period for in-flight requests during shutdown
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Publishes the current root identifier for one topic
///
/// The root starts unset and is replaced wholesale by [`update_root`];
/// concurrent request handlers read it through the shared lock, so a reader
/// observes either the value before an update or the value after, never a
/// torn one. Call [`serve`] once, then [`close`] once.
///
/// [`update_root`]: Publisher::update_root
/// [`serve`]: Publisher::serve
/// [`close`]: Publisher::close
pub struct Publisher {
    root: Arc<RwLock<RootCid>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
}

impl Publisher {
    /// Create a publisher with an unset root, not yet bound to any channel
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        Publisher {
            root: Arc::new(RwLock::new(RootCid::UNSET)),
            shutdown_tx,
            shutdown_rx,
            done_tx,
            done_rx,
        }
    }

    /// Serve head requests for a topic on a host
    ///
    /// Blocks the calling task until [`close`](Publisher::close) is invoked
    /// or the listener fails. Failure to open the listening channel is
    /// terminal: the error is logged and returned, never retried.
    pub async fn serve(&self, host: &Host, topic: &str) -> LoranResult<()> {
        let pid = derive_protocol_id(topic);
        let mut listener = match host.listen(&pid) {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(host = %host.id(), protocol = %pid, "Failed to listen: {}", e);
                return Err(e);
            }
        };
        tracing::info!(host = %host.id(), protocol = %pid, "Serving head requests");

        let mut shutdown = self.shutdown_rx.clone();
        let mut handlers = JoinSet::new();

        let result = if *shutdown.borrow_and_update() {
            Ok(())
        } else {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break Ok(()),
                    inbound = listener.accept() => match inbound {
                        Ok(channel) => {
                            handlers.spawn(handle_request(channel, Arc::clone(&self.root)));
                        }
                        Err(e) => break Err(e),
                    },
                    Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
                }
            }
        };

        // Stop accepting, then drain in-flight handlers within the grace
        // period; whatever is still running afterwards is aborted.
        drop(listener);
        let drain = async {
            while handlers.join_next().await.is_some() {}
        };
        if timeout(CLOSE_TIMEOUT, drain).await.is_err() {
            tracing::warn!("Grace period elapsed; aborting in-flight handlers");
            handlers.abort_all();
            while handlers.join_next().await.is_some() {}
        }

        let _ = self.done_tx.send(true);
        result
    }

    /// Replace the published root unconditionally (last writer wins)
    pub fn update_root(&self, cid: RootCid) {
        *self.root.write() = cid;
    }

    /// Shut down the serving loop gracefully
    ///
    /// Returns once the serve loop has stopped accepting and wound down
    /// its in-flight handlers, bounded by [`CLOSE_TIMEOUT`]. Call exactly
    /// once, after [`serve`](Publisher::serve) is running.
    pub async fn close(&self) -> LoranResult<()> {
        let _ = self.shutdown_tx.send(true);

        let mut done = self.done_rx.clone();
        if *done.borrow_and_update() {
            return Ok(());
        }
        done.changed()
            .await
            .map_err(|_| LoranError::Transport("Serve loop dropped mid-shutdown".into()))?;
        Ok(())
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle one inbound request on its own channel
async fn handle_request(mut channel: Channel, root: Arc<RwLock<RootCid>>) {
    let frame = match channel.recv().await {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(remote = %channel.remote_addr(), "Failed to read request: {}", e);
            return;
        }
    };

    let response = match Request::parse(&frame) {
        Ok(request) if path_base(&request.path) == HEAD_PATH => {
            let current = *root.read();
            if current.is_unset() {
                tracing::debug!("No head is set; responding with empty body");
                Response::ok(Vec::new())
            } else {
                tracing::debug!(head = %current, "Responding with current head");
                Response::ok(current.to_string().into_bytes())
            }
        }
        Ok(request) => {
            tracing::debug!(path = %request.path, "Only head is supported; rejecting request");
            Response::not_found()
        }
        Err(e) => {
            tracing::debug!(remote = %channel.remote_addr(), "Malformed request: {}", e);
            Response::not_found()
        }
    };

    let bytes = match response.serialize() {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("Failed to serialize response: {}", e);
            return;
        }
    };

    // The requester observes a failed exchange on its side; nothing to
    // escalate here.
    if let Err(e) = channel.send(&bytes).await {
        tracing::warn!("Failed to write response: {}", e);
        return;
    }
    let _ = channel.shutdown().await;
}

/// Final `/`-separated segment of a request path
fn path_base(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use loran_core::CODEC_RAW;

    #[test]
    fn test_new_publisher_root_unset() {
        let p = Publisher::new();
        assert!(p.root.read().is_unset());
    }

    #[test]
    fn test_update_root_replaces_value() {
        let p = Publisher::new();
        let a = RootCid::from_data(CODEC_RAW, b"version one");
        let b = RootCid::from_data(CODEC_RAW, b"version two");

        p.update_root(a);
        assert_eq!(*p.root.read(), a);
        p.update_root(b);
        assert_eq!(*p.root.read(), b);
    }

    #[test]
    fn test_path_base() {
        assert_eq!(path_base("head"), "head");
        assert_eq!(path_base("/head"), "head");
        assert_eq!(path_base("/some/prefix/head"), "head");
        assert_eq!(path_base("head/"), "head");
        assert_eq!(path_base("tail"), "tail");
        assert_eq!(path_base(""), "");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_leave_whole_value() {
        let p = Arc::new(Publisher::new());
        let candidates: Vec<RootCid> = (0..16u8)
            .map(|i| RootCid::from_data(CODEC_RAW, &[i]))
            .collect();

        let mut tasks = JoinSet::new();
        for cid in candidates.clone() {
            let p = Arc::clone(&p);
            tasks.spawn(async move { p.update_root(cid) });
        }
        while tasks.join_next().await.is_some() {}

        let seen = *p.root.read();
        assert!(candidates.contains(&seen));
    }
}
