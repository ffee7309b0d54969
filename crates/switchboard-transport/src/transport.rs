use crate::protocol::{TransportRequest, TransportResponse};
use async_trait::async_trait;
use switchboard_core::SwitchboardResult;

/// Uniform send/receive contract over any transport.
///
/// Implementations own the framing (stdio lines, HTTP bodies, queue
/// messages) and surface failures as `SwitchboardError::Transport` so the
/// adapter and dispatcher can classify them. Wire-format details never
/// leak past this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short peer name used in logs.
    fn name(&self) -> &str;

    /// Sends one request and waits for the peer's reply.
    async fn send(&self, request: TransportRequest) -> SwitchboardResult<TransportResponse>;

    /// Cheap reachability probe of the peer.
    async fn ping(&self) -> SwitchboardResult<()>;
}
