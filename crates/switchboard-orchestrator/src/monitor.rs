use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use switchboard_agents::AgentRegistry;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Result of one health-check sweep over the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Per-capability health as of the last sweep.
    pub results: HashMap<String, bool>,
    /// When the last sweep finished; `None` before the first one.
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    /// Capabilities reported unhealthy in this snapshot.
    pub fn unhealthy(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .results
            .iter()
            .filter(|(_, healthy)| !**healthy)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Whether every capability in the snapshot reported healthy.
    pub fn all_healthy(&self) -> bool {
        self.results.values().all(|healthy| *healthy)
    }
}

/// Stores the latest health snapshot produced by the background loop.
///
/// Health results are an eventually-consistent side channel: routing never
/// waits on them, and an unhealthy agent is still routed to unless the
/// caller checks status first.
#[derive(Default)]
pub struct HealthMonitor {
    snapshot: RwLock<HealthSnapshot>,
}

impl HealthMonitor {
    /// Creates a monitor with an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with the results of a fresh sweep.
    pub async fn record(&self, results: HashMap<String, bool>) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.results = results;
        snapshot.checked_at = Some(Utc::now());
    }

    /// The latest snapshot.
    pub async fn latest(&self) -> HealthSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Capabilities reported unhealthy in the latest snapshot.
    pub async fn unhealthy_capabilities(&self) -> Vec<String> {
        self.snapshot.read().await.unhealthy()
    }

    /// Serializes the latest snapshot as JSON for dashboards.
    pub async fn to_json(&self) -> serde_json::Value {
        let snapshot = self.latest().await;
        serde_json::json!({
            "agents": snapshot.results,
            "checked_at": snapshot.checked_at,
            "unhealthy": snapshot.unhealthy(),
        })
    }
}

/// Background loop: sweep all registered agents on a fixed interval until
/// the shutdown signal flips.
///
/// A degraded sweep logs a warning naming the unhealthy capabilities; a bad
/// iteration never terminates the loop. The shutdown signal is observed
/// within one polling interval.
pub(crate) async fn run_monitor_loop(
    registry: Arc<AgentRegistry>,
    monitor: Arc<HealthMonitor>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_secs = interval.as_secs(), "Health monitor started");
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("Health monitor stopping");
                break;
            }
            _ = tokio::time::sleep(interval) => {
                let results = registry.health_check_all().await;
                let unhealthy: Vec<&String> = results
                    .iter()
                    .filter(|(_, healthy)| !**healthy)
                    .map(|(name, _)| name)
                    .collect();
                if unhealthy.is_empty() {
                    debug!(agents = results.len(), "All agents healthy");
                } else {
                    warn!(unhealthy = ?unhealthy, "Unhealthy capabilities detected");
                }
                monitor.record(results).await;
            }
        }
    }
}
