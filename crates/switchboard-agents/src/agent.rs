use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchboard_core::{AgentRequest, Payload, SwitchboardResult};

/// Static metadata describing a registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// The capability this agent serves; the routing key.
    pub capability: String,
    /// Version tag surfaced by status endpoints.
    pub version: String,
    /// One-line description of what the agent does.
    pub description: String,
}

impl AgentDescriptor {
    /// Creates a descriptor for the given capability.
    pub fn new(
        capability: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            capability: capability.into(),
            version: version.into(),
            description: description.into(),
        }
    }
}

/// Trait that every capability agent must implement — whether in-process or
/// reached through a transport adapter.
///
/// The capability name is immutable for the agent's lifetime; agents are
/// constructed once at startup and live for the process lifetime.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Static metadata for this agent.
    fn descriptor(&self) -> &AgentDescriptor;

    /// The capability name this agent serves.
    fn capability(&self) -> &str {
        &self.descriptor().capability
    }

    /// Performs the agent's work for a validated request.
    ///
    /// May take up to the request's timeout budget; the dispatcher enforces
    /// the bound. Failures surface as typed errors, never panics.
    async fn execute(&self, request: &AgentRequest) -> SwitchboardResult<Payload>;

    /// Cheap, side-effect-free liveness probe.
    ///
    /// Expected to return well within a second; it is polled periodically
    /// for every registered agent. An `Err` is treated as unhealthy by
    /// callers and never propagated.
    async fn is_healthy(&self) -> SwitchboardResult<bool>;

    /// Pure predicate over the request's payload shape. No I/O.
    fn validate(&self, request: &AgentRequest) -> bool;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct UppercaseAgent {
        descriptor: AgentDescriptor,
    }

    #[async_trait]
    impl Agent for UppercaseAgent {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        async fn execute(&self, request: &AgentRequest) -> SwitchboardResult<Payload> {
            let mut result = Payload::new();
            for (key, value) in &request.payload {
                let upper = value
                    .as_str()
                    .map(str::to_uppercase)
                    .map(serde_json::Value::from)
                    .unwrap_or_else(|| value.clone());
                result.insert(key.clone(), upper);
            }
            Ok(result)
        }

        async fn is_healthy(&self) -> SwitchboardResult<bool> {
            Ok(true)
        }

        fn validate(&self, request: &AgentRequest) -> bool {
            !request.payload.is_empty()
        }
    }

    #[tokio::test]
    async fn capability_comes_from_descriptor() {
        let agent = UppercaseAgent {
            descriptor: AgentDescriptor::new("uppercase", "1.0.0", "Uppercases string values"),
        };
        assert_eq!(agent.capability(), "uppercase");
        assert!(agent.is_healthy().await.unwrap());
    }

    #[tokio::test]
    async fn validate_gates_empty_payloads() {
        let agent = UppercaseAgent {
            descriptor: AgentDescriptor::new("uppercase", "1.0.0", ""),
        };

        let empty = AgentRequest::new("uppercase", Payload::new());
        assert!(!agent.validate(&empty));

        let mut payload = Payload::new();
        payload.insert("text".into(), serde_json::json!("hello"));
        let req = AgentRequest::new("uppercase", payload);
        assert!(agent.validate(&req));

        let result = agent.execute(&req).await.unwrap();
        assert_eq!(result["text"], serde_json::json!("HELLO"));
    }
}
