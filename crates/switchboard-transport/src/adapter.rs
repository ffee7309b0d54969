use crate::protocol::{TransportFault, TransportRequest, PROTOCOL_VERSION};
use crate::transport::Transport;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use switchboard_agents::{Agent, AgentDescriptor};
use switchboard_core::{AgentRequest, Payload, SwitchboardError, SwitchboardResult};
use tracing::{debug, warn};

/// Minimal payload shape check applied when schema validation is on.
#[derive(Debug, Clone, Default)]
pub struct PayloadSchema {
    /// Keys that must be present in the payload.
    pub required: Vec<String>,
}

impl PayloadSchema {
    /// A schema requiring the given payload keys.
    pub fn requiring<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the payload satisfies the schema.
    pub fn accepts(&self, payload: &Payload) -> bool {
        self.required.iter().all(|key| payload.contains_key(key))
    }
}

/// An agent reached through a [`Transport`].
///
/// Implements the same contract as an in-process agent, so the dispatcher's
/// retry and timeout policy applies to remote capabilities unchanged. Peer
/// faults are mapped onto the typed-error vocabulary before they reach the
/// dispatcher.
pub struct TransportAgent {
    descriptor: AgentDescriptor,
    transport: Arc<dyn Transport>,
    schema: Option<PayloadSchema>,
}

impl TransportAgent {
    /// Wraps a transport behind the agent contract, schema validation off.
    pub fn new(descriptor: AgentDescriptor, transport: Arc<dyn Transport>) -> Self {
        Self {
            descriptor,
            transport,
            schema: None,
        }
    }

    /// Turns on payload schema validation with the given schema.
    pub fn with_schema(mut self, schema: PayloadSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

fn map_fault(fault: TransportFault) -> SwitchboardError {
    match fault.code.as_str() {
        "SCHEMA_VALIDATION_ERROR" => SwitchboardError::SchemaValidation(fault.message),
        _ => SwitchboardError::Transport(format!("{}: {}", fault.code, fault.message)),
    }
}

#[async_trait]
impl Agent for TransportAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn execute(&self, request: &AgentRequest) -> SwitchboardResult<Payload> {
        let started = Instant::now();
        let wire = TransportRequest::from_agent_request(request);
        let response = self.transport.send(wire).await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        debug!(
            transport = %self.transport.name(),
            capability = %request.capability,
            request_id = %request.request_id,
            latency_ms,
            "Transport round trip"
        );

        if let Some(version) = &response.protocol_version {
            if version != PROTOCOL_VERSION {
                warn!(
                    transport = %self.transport.name(),
                    peer_version = %version,
                    "Protocol version mismatch"
                );
                return Err(SwitchboardError::Transport(format!(
                    "Protocol version mismatch: peer speaks {version}, expected {PROTOCOL_VERSION}"
                )));
            }
        }

        if let Some(fault) = response.fault {
            return Err(map_fault(fault));
        }

        response.result.ok_or_else(|| {
            SwitchboardError::Transport("Peer replied with neither result nor fault".into())
        })
    }

    async fn is_healthy(&self) -> SwitchboardResult<bool> {
        self.transport.ping().await?;
        Ok(true)
    }

    fn validate(&self, request: &AgentRequest) -> bool {
        match &self.schema {
            Some(schema) => schema.accepts(&request.payload),
            None => true,
        }
    }
}
