use crate::config::OrchestratorConfig;
use crate::monitor::{run_monitor_loop, HealthMonitor};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use switchboard_agents::{AgentDescriptor, AgentRegistry};
use switchboard_core::{
    AgentRequest, AgentResponse, ErrorCode, SwitchboardError,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Point-in-time status of a single capability, as reported by
/// [`Dispatcher::agent_status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentStatus {
    /// The agent answered its probe affirmatively.
    Healthy {
        /// Static metadata for the capability.
        info: AgentDescriptor,
    },
    /// The agent answered its probe negatively.
    Unhealthy {
        /// Static metadata for the capability.
        info: AgentDescriptor,
    },
    /// No agent is registered for the capability.
    NotFound,
    /// The probe itself failed.
    Error {
        /// Human-readable probe failure.
        error: String,
    },
}

/// Aggregate dispatcher status from [`Dispatcher::system_status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Dispatcher-level summary.
    pub orchestrator: OrchestratorInfo,
    /// Per-capability breakdown.
    pub agents: HashMap<String, CapabilityHealth>,
}

/// Dispatcher-level summary inside a [`SystemStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorInfo {
    /// `"running"` once started, `"stopped"` otherwise.
    pub status: String,
    /// Number of registered agents.
    pub registered_agents: usize,
}

/// One capability's entry inside a [`SystemStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityHealth {
    /// Static metadata for the capability.
    pub info: AgentDescriptor,
    /// Health as of the latest sweep.
    pub healthy: bool,
}

#[derive(Default)]
struct Lifecycle {
    running: bool,
    shutdown_tx: Option<watch::Sender<bool>>,
    monitor_task: Option<JoinHandle<()>>,
}

/// The central coordinator: validates requests, resolves agents from the
/// registry, executes with bounded retry and per-attempt timeouts, and
/// returns structured responses.
///
/// The dispatcher keeps no per-request state between calls; concurrent
/// `route` calls are independent. The registry is injected at construction
/// rather than reached through a global, so tests build isolated instances.
pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
    config: OrchestratorConfig,
    monitor: Arc<HealthMonitor>,
    lifecycle: Mutex<Lifecycle>,
}

impl Dispatcher {
    /// Creates a dispatcher over an already-populated registry.
    pub fn new(registry: Arc<AgentRegistry>, config: OrchestratorConfig) -> Self {
        Self {
            registry,
            config,
            monitor: Arc::new(HealthMonitor::new()),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// The registry this dispatcher routes through.
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// The health snapshot store fed by the background loop.
    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    /// Whether `start` has been called without a matching `stop`.
    pub fn is_running(&self) -> bool {
        self.lifecycle.lock().running
    }

    /// Launches the background health-monitor loop.
    ///
    /// Idempotent: a second call while running is a no-op and never spawns
    /// a second loop.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.running {
            debug!("Dispatcher already started");
            return;
        }

        let (tx, rx) = watch::channel(false);
        let interval = Duration::from_secs(self.config.health_check_interval_secs);
        let task = tokio::spawn(run_monitor_loop(
            self.registry.clone(),
            self.monitor.clone(),
            interval,
            rx,
        ));

        lifecycle.shutdown_tx = Some(tx);
        lifecycle.monitor_task = Some(task);
        lifecycle.running = true;
        info!(
            registered_agents = self.registry.len(),
            health_interval_secs = self.config.health_check_interval_secs,
            "Dispatcher started"
        );
    }

    /// Signals the health-monitor loop to exit and waits for it.
    ///
    /// Safe to call even if `start` was never called. No background task
    /// outlives this call.
    pub async fn stop(&self) {
        let (tx, task) = {
            let mut lifecycle = self.lifecycle.lock();
            if !lifecycle.running {
                debug!("Dispatcher not running, nothing to stop");
                return;
            }
            lifecycle.running = false;
            (lifecycle.shutdown_tx.take(), lifecycle.monitor_task.take())
        };

        if let Some(tx) = tx {
            let _ = tx.send(true);
        }
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Health monitor task ended abnormally");
            }
        }
        info!("Dispatcher stopped");
    }

    /// Routes a request to its capability agent and returns a terminal
    /// response.
    ///
    /// Every failure path is caught and converted into a typed response; no
    /// agent error escapes this call. The measured execution time spans all
    /// attempts, backoff included.
    pub async fn route(&self, request: AgentRequest) -> AgentResponse {
        let started = Instant::now();

        if !request.is_dispatchable() {
            warn!(
                request_id = %request.request_id,
                capability = %request.capability,
                "Rejected request with missing id or capability"
            );
            return AgentResponse::failed(
                &request,
                ErrorCode::InvalidRequest,
                "Request is missing a request id or capability",
                started.elapsed().as_secs_f64(),
            );
        }

        let Some(agent) = self.registry.lookup(&request.capability) else {
            warn!(
                request_id = %request.request_id,
                capability = %request.capability,
                "No agent registered for capability"
            );
            let err = SwitchboardError::AgentNotFound(request.capability.clone());
            return AgentResponse::failed(
                &request,
                err.code(),
                err.to_string(),
                started.elapsed().as_secs_f64(),
            );
        };

        if !agent.validate(&request) {
            warn!(
                request_id = %request.request_id,
                capability = %request.capability,
                "Agent rejected request payload"
            );
            return AgentResponse::failed(
                &request,
                ErrorCode::InvalidInput,
                format!(
                    "Payload rejected by '{}' validation",
                    request.capability
                ),
                started.elapsed().as_secs_f64(),
            );
        }

        debug!(
            request_id = %request.request_id,
            capability = %request.capability,
            priority = ?request.priority,
            "Request validated, executing"
        );

        let timeout_secs = if request.timeout_secs == 0 {
            self.config.default_timeout_secs
        } else {
            request.timeout_secs
        };
        let attempt_budget = Duration::from_secs(timeout_secs);
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut last_err = SwitchboardError::Agent("no execution attempt made".into());

        for attempt in 1..=max_attempts {
            match tokio::time::timeout(attempt_budget, agent.execute(&request)).await {
                Ok(Ok(result)) => {
                    let elapsed = started.elapsed().as_secs_f64();
                    info!(
                        request_id = %request.request_id,
                        capability = %request.capability,
                        attempt,
                        elapsed_secs = elapsed,
                        "Request completed"
                    );
                    return AgentResponse::completed(&request, result, elapsed);
                }
                Ok(Err(e)) => {
                    if !e.is_retryable() {
                        warn!(
                            request_id = %request.request_id,
                            capability = %request.capability,
                            attempt,
                            error = %e,
                            "Non-retryable execution error"
                        );
                        return AgentResponse::failed(
                            &request,
                            e.code(),
                            e.to_string(),
                            started.elapsed().as_secs_f64(),
                        );
                    }
                    last_err = e;
                }
                Err(_) => {
                    last_err = SwitchboardError::Timeout(timeout_secs);
                }
            }

            if attempt < max_attempts {
                let delay = self.config.retry.delay_for_attempt(attempt);
                warn!(
                    request_id = %request.request_id,
                    capability = %request.capability,
                    attempt,
                    delay_ms = delay,
                    error = %last_err,
                    "Attempt failed, backing off"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        error!(
            request_id = %request.request_id,
            capability = %request.capability,
            attempts = max_attempts,
            error = %last_err,
            "All execution attempts exhausted"
        );
        match last_err {
            SwitchboardError::Timeout(_) => {
                AgentResponse::timed_out(&request, last_err.to_string(), elapsed)
            }
            other => AgentResponse::failed(&request, other.code(), other.to_string(), elapsed),
        }
    }

    /// Probes one capability synchronously.
    ///
    /// A probe failure is reported as data, never raised.
    pub async fn agent_status(&self, capability: &str) -> AgentStatus {
        let Some(agent) = self.registry.lookup(capability) else {
            return AgentStatus::NotFound;
        };
        let info = agent.descriptor().clone();
        match agent.is_healthy().await {
            Ok(true) => AgentStatus::Healthy { info },
            Ok(false) => AgentStatus::Unhealthy { info },
            Err(e) => AgentStatus::Error {
                error: e.to_string(),
            },
        }
    }

    /// Aggregate status: dispatcher lifecycle, agent count, and a fresh
    /// per-capability health breakdown.
    ///
    /// The sweep is also recorded as the monitor's latest snapshot.
    pub async fn system_status(&self) -> SystemStatus {
        let health = self.registry.health_check_all().await;
        self.monitor.record(health.clone()).await;

        let agents = self
            .registry
            .list()
            .into_iter()
            .map(|(name, info)| {
                let healthy = health.get(&name).copied().unwrap_or(false);
                (name, CapabilityHealth { info, healthy })
            })
            .collect();

        SystemStatus {
            orchestrator: OrchestratorInfo {
                status: if self.is_running() {
                    "running".to_string()
                } else {
                    "stopped".to_string()
                },
                registered_agents: self.registry.len(),
            },
            agents,
        }
    }
}
