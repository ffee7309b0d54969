//! Wire envelope types exchanged with a transport peer.
//!
//! Field names are camelCase on the wire so peers in other languages can
//! speak the protocol without adapters of their own.

use serde::{Deserialize, Serialize};
use switchboard_core::{AgentRequest, Payload, Priority};

/// Protocol revision this adapter speaks.
pub const PROTOCOL_VERSION: &str = "1.0";

/// A request as sent over a transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    /// Mirrors the dispatcher request id.
    pub id: String,
    /// Target capability on the peer side.
    pub capability: String,
    /// Opaque payload, forwarded untouched.
    pub payload: Payload,
    /// Informational priority, carried for the peer's observability.
    pub priority: Priority,
    /// The caller's per-attempt budget; peers should give up within it.
    pub timeout_secs: u64,
    /// Trace id, if the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Protocol revision of the sender.
    pub protocol_version: String,
}

impl TransportRequest {
    /// Builds the wire form of a dispatcher request.
    pub fn from_agent_request(request: &AgentRequest) -> Self {
        Self {
            id: request.request_id.clone(),
            capability: request.capability.clone(),
            payload: request.payload.clone(),
            priority: request.priority,
            timeout_secs: request.timeout_secs,
            correlation_id: request.correlation_id.clone(),
            protocol_version: PROTOCOL_VERSION.to_string(),
        }
    }
}

/// A peer's reply to a [`TransportRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportResponse {
    /// Mirrors the request id.
    pub id: String,
    /// Protocol revision of the peer; checked by the adapter when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
    /// Successful result, absent on fault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Payload>,
    /// Fault raised by the peer, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<TransportFault>,
}

impl TransportResponse {
    /// A successful reply carrying a result.
    pub fn ok(id: impl Into<String>, result: Payload) -> Self {
        Self {
            id: id.into(),
            protocol_version: Some(PROTOCOL_VERSION.to_string()),
            result: Some(result),
            fault: None,
        }
    }

    /// A fault reply.
    pub fn fault(id: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            protocol_version: Some(PROTOCOL_VERSION.to_string()),
            result: None,
            fault: Some(TransportFault {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// A transport-level fault object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportFault {
    /// Peer-assigned fault code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}
