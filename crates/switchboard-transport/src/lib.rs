//! Transport adapter contract for the Switchboard dispatch layer.
//!
//! The dispatcher never talks to a socket directly. Anything reachable
//! through a [`Transport`] — stdio subprocess, HTTP peer, message queue —
//! is wrapped in a [`TransportAgent`], which exposes the same
//! execute/health/validate surface as an in-process agent. The adapter
//! handles schema validation toggles, protocol versioning, and latency
//! measurement, and maps transport-level faults onto the dispatcher's
//! typed-error vocabulary so retry and timeout policy apply uniformly.

/// The adapter that implements the agent contract over a transport.
pub mod adapter;
/// Wire envelope types and the protocol version.
pub mod protocol;
/// The uniform send/receive contract.
pub mod transport;

pub use adapter::{PayloadSchema, TransportAgent};
pub use protocol::{TransportFault, TransportRequest, TransportResponse, PROTOCOL_VERSION};
pub use transport::Transport;
