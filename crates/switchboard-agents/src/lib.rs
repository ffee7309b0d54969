//! Capability contract and agent registry for the Switchboard dispatch layer.
//!
//! An agent is anything that implements [`Agent`]: it executes requests for
//! one named capability, answers a cheap liveness probe, and validates
//! payloads before execution. The [`AgentRegistry`] is the concurrency-safe
//! map from capability name to agent instance that the dispatcher routes
//! through.

/// The polymorphic agent contract.
pub mod agent;
/// Capability name to agent instance mapping.
pub mod registry;

pub use agent::{Agent, AgentDescriptor};
pub use registry::AgentRegistry;
