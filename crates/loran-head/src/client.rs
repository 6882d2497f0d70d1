//! Client query - fetch the current root from a remote publisher

use loran_core::{LoranError, LoranResult, PeerId, RootCid};
use loran_transport::Host;
use loran_wire::{Request, Response, Status};

use crate::{derive_protocol_id, HEAD_PATH};

/// Query a remote publisher for its current root identifier
///
/// One synchronous round trip: dial a transient channel scoped to the
/// topic's protocol identifier, send a single `head` request, read the
/// whole response, parse. The remote peer's address must already be in
/// `host`'s address book.
///
/// An empty response body is the normal "no root published yet" outcome
/// and yields [`RootCid::UNSET`] with no error. Every failure - dial,
/// transport, decode - is returned to the caller without retry; deadline
/// and cancellation are the caller's, via `tokio::time::timeout` or
/// dropping the future.
pub async fn query_root_cid(host: &Host, topic: &str, remote: PeerId) -> LoranResult<RootCid> {
    let pid = derive_protocol_id(topic);
    let mut channel = host.dial(remote, &pid).await?;

    let request = Request::get(HEAD_PATH).serialize()?;
    channel.send(&request).await?;

    let frame = channel.recv().await?;
    let response = Response::parse(&frame)?;

    match response.status {
        Status::NotFound => Err(LoranError::HeadNotFound),
        Status::Ok if response.body.is_empty() => {
            tracing::debug!("No head is set; returning the unset sentinel");
            Ok(RootCid::UNSET)
        }
        Status::Ok => {
            let text = String::from_utf8_lossy(&response.body);
            match text.parse::<RootCid>() {
                Ok(cid) => {
                    tracing::debug!(head = %cid, "Queried latest head");
                    Ok(cid)
                }
                Err(e) => {
                    tracing::error!("Failed to decode head {:?}: {}", text, e);
                    Err(e)
                }
            }
        }
    }
}
