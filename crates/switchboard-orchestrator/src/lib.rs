//! Request dispatcher for the Switchboard agent orchestration core.
//!
//! The dispatcher routes typed requests to registered capability agents:
//! it validates the envelope, resolves the agent, executes with bounded
//! retry and per-attempt timeouts, and returns a structured response. A
//! background loop polls every registered agent's health on a fixed
//! interval while the dispatcher is started.
//!
//! # Main types
//!
//! - [`Dispatcher`] — Validates, routes, retries, and reports status.
//! - [`HealthMonitor`] — Latest health snapshot from the background loop.
//! - [`OrchestratorConfig`] / [`RetryPolicy`] — Tunables with zero-config
//!   defaults.

/// Dispatcher configuration and retry tunables.
pub mod config;
/// Routing engine and status queries.
pub mod engine;
/// Health snapshot store and the background polling loop.
pub mod monitor;

pub use config::{OrchestratorConfig, RetryPolicy};
pub use engine::{AgentStatus, CapabilityHealth, Dispatcher, OrchestratorInfo, SystemStatus};
pub use monitor::{HealthMonitor, HealthSnapshot};
