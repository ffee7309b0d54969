//! Core types and error definitions for the Switchboard dispatch layer.
//!
//! This crate provides the foundational types shared across all Switchboard
//! crates: the error taxonomy, machine-matchable error codes, and the
//! request/response envelopes exchanged between callers and the dispatcher.
//!
//! # Main types
//!
//! - [`SwitchboardError`] — Unified error enum for all Switchboard subsystems.
//! - [`SwitchboardResult`] — Convenience alias for `Result<T, SwitchboardError>`.
//! - [`ErrorCode`] — Machine-matchable failure codes carried on responses.
//! - [`AgentRequest`] — The request envelope routed to a capability agent.
//! - [`AgentResponse`] — The terminal response returned to the caller.

/// Request/response envelopes, priority, and response status.
pub mod envelope;

use serde::{Deserialize, Serialize};

pub use envelope::{AgentRequest, AgentResponse, Payload, Priority, ResponseStatus};

// --- Error types ---

/// Machine-matchable failure code carried on a failed [`AgentResponse`].
///
/// Codes are serialized and displayed in their wire form
/// (`INVALID_REQUEST`, `AGENT_NOT_FOUND`, ...) so callers can match on them
/// without parsing the human-readable error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request envelope itself was malformed (missing id or capability).
    InvalidRequest,
    /// The target capability is not registered.
    AgentNotFound,
    /// The agent's own validation rejected the payload.
    InvalidInput,
    /// An execution attempt exceeded its time budget.
    Timeout,
    /// The agent raised an error during execution.
    OrchestratorError,
    /// A transport adapter rejected the payload against its schema.
    SchemaValidationError,
    /// A transport-level failure (connection, framing, peer fault).
    TransportError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::AgentNotFound => "AGENT_NOT_FOUND",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::OrchestratorError => "ORCHESTRATOR_ERROR",
            ErrorCode::SchemaValidationError => "SCHEMA_VALIDATION_ERROR",
            ErrorCode::TransportError => "TRANSPORT_ERROR",
        };
        write!(f, "{s}")
    }
}

/// Top-level error type for the Switchboard dispatch layer.
///
/// Each variant corresponds to a failure kind the dispatcher knows how to
/// classify. Catch sites convert into one of these variants rather than
/// passing a generic "something went wrong" upward.
#[derive(Debug, thiserror::Error)]
pub enum SwitchboardError {
    /// The request envelope was malformed before any routing happened.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No agent is registered for the requested capability.
    #[error("Agent not found for capability '{0}'")]
    AgentNotFound(String),

    /// The agent's `validate` rejected the request payload.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An execution attempt ran past its time budget.
    #[error("Execution timed out after {0}s")]
    Timeout(u64),

    /// An error raised by an agent during `execute`.
    #[error("Agent error: {0}")]
    Agent(String),

    /// A transport-level failure between the adapter and its peer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport adapter's schema validation rejected the payload.
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`SwitchboardError`].
pub type SwitchboardResult<T> = Result<T, SwitchboardError>;

impl SwitchboardError {
    /// The wire code this error maps to on a failed response.
    pub fn code(&self) -> ErrorCode {
        match self {
            SwitchboardError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            SwitchboardError::AgentNotFound(_) => ErrorCode::AgentNotFound,
            SwitchboardError::InvalidInput(_) => ErrorCode::InvalidInput,
            SwitchboardError::Timeout(_) => ErrorCode::Timeout,
            SwitchboardError::Agent(_)
            | SwitchboardError::Config(_)
            | SwitchboardError::Json(_) => ErrorCode::OrchestratorError,
            SwitchboardError::Transport(_) | SwitchboardError::Io(_) => ErrorCode::TransportError,
            SwitchboardError::SchemaValidation(_) => ErrorCode::SchemaValidationError,
        }
    }

    /// Whether an execution attempt that failed with this error is worth
    /// retrying.
    ///
    /// Only timeouts and transient execution/transport failures qualify.
    /// Malformed envelopes, unknown capabilities, and rejected payloads are
    /// deterministic and retrying them cannot succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwitchboardError::Timeout(_)
                | SwitchboardError::Agent(_)
                | SwitchboardError::Transport(_)
                | SwitchboardError::Io(_)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_code_wire_form() {
        assert_eq!(ErrorCode::InvalidRequest.to_string(), "INVALID_REQUEST");
        assert_eq!(ErrorCode::AgentNotFound.to_string(), "AGENT_NOT_FOUND");
        assert_eq!(
            ErrorCode::SchemaValidationError.to_string(),
            "SCHEMA_VALIDATION_ERROR"
        );

        // Serde form matches the Display form
        let json = serde_json::to_string(&ErrorCode::OrchestratorError).unwrap();
        assert_eq!(json, "\"ORCHESTRATOR_ERROR\"");
        let parsed: ErrorCode = serde_json::from_str("\"TIMEOUT\"").unwrap();
        assert_eq!(parsed, ErrorCode::Timeout);
    }

    #[test]
    fn error_to_code_mapping() {
        assert_eq!(
            SwitchboardError::InvalidRequest("empty id".into()).code(),
            ErrorCode::InvalidRequest
        );
        assert_eq!(
            SwitchboardError::AgentNotFound("billing".into()).code(),
            ErrorCode::AgentNotFound
        );
        assert_eq!(
            SwitchboardError::Agent("boom".into()).code(),
            ErrorCode::OrchestratorError
        );
        assert_eq!(SwitchboardError::Timeout(30).code(), ErrorCode::Timeout);
        assert_eq!(
            SwitchboardError::SchemaValidation("missing field".into()).code(),
            ErrorCode::SchemaValidationError
        );
    }

    #[test]
    fn retryable_classification() {
        // Retryable: transient execution and transport failures
        assert!(SwitchboardError::Timeout(1).is_retryable());
        assert!(SwitchboardError::Agent("flaky".into()).is_retryable());
        assert!(SwitchboardError::Transport("peer reset".into()).is_retryable());

        // Not retryable: deterministic failures
        assert!(!SwitchboardError::InvalidRequest("no id".into()).is_retryable());
        assert!(!SwitchboardError::AgentNotFound("scoring".into()).is_retryable());
        assert!(!SwitchboardError::InvalidInput("bad shape".into()).is_retryable());
        assert!(!SwitchboardError::SchemaValidation("missing key".into()).is_retryable());
    }

    #[test]
    fn error_display_names_capability() {
        let err = SwitchboardError::AgentNotFound("retrieval".into());
        assert!(err.to_string().contains("retrieval"));
    }
}
