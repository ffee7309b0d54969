use crate::ErrorCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque key/value payload carried by requests and results.
///
/// The dispatcher never inspects its contents beyond handing it to the
/// agent's `validate`.
pub type Payload = HashMap<String, serde_json::Value>;

/// Priority of a request.
///
/// Informational only: it is carried through for downstream consumers and
/// observability, and never reorders execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Background work.
    Low,
    /// Ordinary request.
    #[default]
    Normal,
    /// User-facing work.
    High,
    /// Incident-path work.
    Critical,
}

/// Status of a request as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Accepted but not yet validated.
    Pending,
    /// Currently executing.
    Running,
    /// Finished successfully; the response carries a result.
    Completed,
    /// Finished with an error; the response carries an error and code.
    Failed,
    /// The final attempt exceeded its time budget.
    Timeout,
}

impl ResponseStatus {
    /// Whether this status ends the request lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResponseStatus::Completed | ResponseStatus::Failed | ResponseStatus::Timeout
        )
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseStatus::Pending => write!(f, "pending"),
            ResponseStatus::Running => write!(f, "running"),
            ResponseStatus::Completed => write!(f, "completed"),
            ResponseStatus::Failed => write!(f, "failed"),
            ResponseStatus::Timeout => write!(f, "timeout"),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// The request envelope routed to a capability agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Caller-supplied correlation id, unique per logical request.
    pub request_id: String,
    /// Name of the target capability; the routing key.
    pub capability: String,
    /// Agent-specific payload.
    pub payload: Payload,
    /// Informational priority.
    #[serde(default)]
    pub priority: Priority,
    /// Upper bound in seconds for a single execution attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional id propagated for tracing across agent boundaries.
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// UTC timestamp of when the envelope was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl AgentRequest {
    /// Creates a request for the given capability with a generated id.
    pub fn new(capability: impl Into<String>, payload: Payload) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            capability: capability.into(),
            payload,
            priority: Priority::Normal,
            timeout_secs: default_timeout_secs(),
            correlation_id: None,
            created_at: Utc::now(),
        }
    }

    /// Overrides the generated request id with a caller-supplied one.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the per-attempt timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Attaches a correlation id for tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Whether the envelope carries enough to be routed at all.
    pub fn is_dispatchable(&self) -> bool {
        !self.request_id.is_empty() && !self.capability.is_empty()
    }
}

/// The terminal response returned to the caller.
///
/// Exactly one of `result` or (`error`, `error_code`) is populated once the
/// status is terminal; the constructors uphold this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Mirrored from the request.
    pub request_id: String,
    /// Mirrored from the request.
    pub capability: String,
    /// Outcome of the request.
    pub status: ResponseStatus,
    /// Agent result, present iff `status == Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Payload>,
    /// Human-readable error, present iff the request did not complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-matchable code, present iff the request did not complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Wall-clock seconds from first attempt to return, retries included.
    pub execution_time_secs: f64,
    /// Agent- or dispatcher-supplied annotations.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: Payload,
}

impl AgentResponse {
    /// A successful terminal response carrying the agent's result.
    pub fn completed(request: &AgentRequest, result: Payload, execution_time_secs: f64) -> Self {
        Self {
            request_id: request.request_id.clone(),
            capability: request.capability.clone(),
            status: ResponseStatus::Completed,
            result: Some(result),
            error: None,
            error_code: None,
            execution_time_secs,
            metadata: HashMap::new(),
        }
    }

    /// A failed terminal response with a human-readable error and wire code.
    pub fn failed(
        request: &AgentRequest,
        code: ErrorCode,
        error: impl Into<String>,
        execution_time_secs: f64,
    ) -> Self {
        Self {
            request_id: request.request_id.clone(),
            capability: request.capability.clone(),
            status: ResponseStatus::Failed,
            result: None,
            error: Some(error.into()),
            error_code: Some(code),
            execution_time_secs,
            metadata: HashMap::new(),
        }
    }

    /// A terminal response for a request whose final attempt timed out.
    ///
    /// Distinct from [`AgentResponse::failed`] so callers can tell "agent
    /// errored" from "agent hung".
    pub fn timed_out(
        request: &AgentRequest,
        error: impl Into<String>,
        execution_time_secs: f64,
    ) -> Self {
        Self {
            request_id: request.request_id.clone(),
            capability: request.capability.clone(),
            status: ResponseStatus::Timeout,
            result: None,
            error: Some(error.into()),
            error_code: Some(ErrorCode::Timeout),
            execution_time_secs,
            metadata: HashMap::new(),
        }
    }

    /// Attaches an annotation to the response metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the response completed successfully.
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Completed
    }
}
