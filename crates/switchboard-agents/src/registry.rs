use crate::agent::{Agent, AgentDescriptor};
use futures_util::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Concurrency-safe map from capability name to agent instance.
///
/// Registration happens rarely (startup) while lookups happen on every
/// request, so a single read/write lock over the map is enough. A `register`
/// call is visible to every lookup that starts after it returns.
///
/// Entries are never silently removed: a capability that becomes unhealthy
/// stays registered and is reported as unhealthy instead.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<String, Arc<dyn Agent>>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or overwrites the entry for the agent's capability.
    ///
    /// Idempotent: registering the same capability twice replaces the prior
    /// entry.
    pub fn register(&self, agent: Arc<dyn Agent>) {
        let capability = agent.capability().to_string();
        let replaced = self
            .agents
            .write()
            .insert(capability.clone(), agent)
            .is_some();
        info!(capability = %capability, replaced, "Registered agent");
    }

    /// O(1) lookup; `None` when the capability is unknown.
    pub fn lookup(&self, capability: &str) -> Option<Arc<dyn Agent>> {
        self.agents.read().get(capability).cloned()
    }

    /// Static metadata for every registered capability.
    pub fn list(&self) -> HashMap<String, AgentDescriptor> {
        self.agents
            .read()
            .iter()
            .map(|(name, agent)| (name.clone(), agent.descriptor().clone()))
            .collect()
    }

    /// The registered capability names.
    pub fn capabilities(&self) -> Vec<String> {
        self.agents.read().keys().cloned().collect()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    /// Whether no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    /// Probes every registered agent concurrently.
    ///
    /// Each probe runs in its own task, so an erroring or panicking probe
    /// marks only that capability as unhealthy and can never break the
    /// aggregate check.
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let agents: Vec<(String, Arc<dyn Agent>)> = {
            let map = self.agents.read();
            map.iter()
                .map(|(name, agent)| (name.clone(), agent.clone()))
                .collect()
        };

        let mut names = Vec::with_capacity(agents.len());
        let mut probes = Vec::with_capacity(agents.len());
        for (capability, agent) in agents {
            names.push(capability);
            probes.push(tokio::spawn(async move { agent.is_healthy().await }));
        }

        let mut results = HashMap::with_capacity(names.len());
        for (capability, outcome) in names.into_iter().zip(join_all(probes).await) {
            let healthy = match outcome {
                Ok(Ok(healthy)) => healthy,
                Ok(Err(e)) => {
                    warn!(capability = %capability, error = %e, "Health check failed");
                    false
                }
                Err(e) => {
                    warn!(capability = %capability, error = %e, "Health check panicked");
                    false
                }
            };
            results.insert(capability, healthy);
        }
        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use switchboard_core::{AgentRequest, Payload, SwitchboardError, SwitchboardResult};

    enum ProbeBehavior {
        Healthy,
        Unhealthy,
        Errors,
        Panics,
    }

    struct ProbeAgent {
        descriptor: AgentDescriptor,
        behavior: ProbeBehavior,
        probes: AtomicU32,
    }

    impl ProbeAgent {
        fn new(capability: &str, behavior: ProbeBehavior) -> Arc<Self> {
            Arc::new(Self {
                descriptor: AgentDescriptor::new(capability, "1.0.0", "probe test agent"),
                behavior,
                probes: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl Agent for ProbeAgent {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        async fn execute(&self, _request: &AgentRequest) -> SwitchboardResult<Payload> {
            Ok(Payload::new())
        }

        async fn is_healthy(&self) -> SwitchboardResult<bool> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                ProbeBehavior::Healthy => Ok(true),
                ProbeBehavior::Unhealthy => Ok(false),
                ProbeBehavior::Errors => {
                    Err(SwitchboardError::Agent("probe connection refused".into()))
                }
                ProbeBehavior::Panics => panic!("probe panicked"),
            }
        }

        fn validate(&self, _request: &AgentRequest) -> bool {
            true
        }
    }

    #[test]
    fn register_and_lookup() {
        let registry = AgentRegistry::new();
        assert!(registry.is_empty());

        registry.register(ProbeAgent::new("ingest", ProbeBehavior::Healthy));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("ingest").is_some());
        assert!(registry.lookup("scoring").is_none());
    }

    #[test]
    fn register_is_idempotent() {
        let registry = AgentRegistry::new();
        registry.register(ProbeAgent::new("ingest", ProbeBehavior::Healthy));
        registry.register(ProbeAgent::new("ingest", ProbeBehavior::Unhealthy));

        // Second registration replaced the first, no duplicate entry
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_exposes_descriptors() {
        let registry = AgentRegistry::new();
        registry.register(ProbeAgent::new("ingest", ProbeBehavior::Healthy));
        registry.register(ProbeAgent::new("scoring", ProbeBehavior::Healthy));

        let listed = registry.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed["ingest"].capability, "ingest");
        assert_eq!(listed["scoring"].version, "1.0.0");

        let mut capabilities = registry.capabilities();
        capabilities.sort();
        assert_eq!(capabilities, vec!["ingest", "scoring"]);
    }

    #[tokio::test]
    async fn health_check_all_reports_each_agent() {
        let registry = AgentRegistry::new();
        registry.register(ProbeAgent::new("ingest", ProbeBehavior::Healthy));
        registry.register(ProbeAgent::new("scoring", ProbeBehavior::Unhealthy));

        let results = registry.health_check_all().await;
        assert_eq!(results.len(), 2);
        assert!(results["ingest"]);
        assert!(!results["scoring"]);
    }

    #[tokio::test]
    async fn erroring_probe_never_breaks_the_aggregate_check() {
        let registry = AgentRegistry::new();
        let healthy = ProbeAgent::new("ingest", ProbeBehavior::Healthy);
        registry.register(healthy.clone());
        registry.register(ProbeAgent::new("billing", ProbeBehavior::Errors));
        registry.register(ProbeAgent::new("notify", ProbeBehavior::Panics));

        let results = registry.health_check_all().await;
        assert_eq!(results.len(), 3);
        assert!(results["ingest"]);
        assert!(!results["billing"]);
        assert!(!results["notify"]);
        assert_eq!(healthy.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn health_check_on_empty_registry_is_empty() {
        let registry = AgentRegistry::new();
        assert!(registry.health_check_all().await.is_empty());
    }

    #[tokio::test]
    async fn registration_is_visible_to_concurrent_lookups() {
        let registry = Arc::new(AgentRegistry::new());

        let writer = {
            let registry = registry.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    registry.register(ProbeAgent::new(
                        &format!("capability-{i}"),
                        ProbeBehavior::Healthy,
                    ));
                }
            })
        };

        let reader = {
            let registry = registry.clone();
            tokio::spawn(async move {
                // Lookups and enumeration run concurrently with registration
                // without corruption; exact counts vary by interleaving.
                for _ in 0..50 {
                    let _ = registry.lookup("capability-0");
                    let _ = registry.list();
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(registry.len(), 50);
        assert!(registry.lookup("capability-49").is_some());
    }
}
