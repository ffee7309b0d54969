#![allow(clippy::unwrap_used, clippy::expect_used)]

use switchboard_core::*;

// ---------------------------------------------------------------------------
// 1. Request envelope serialization roundtrip with metadata-bearing payload
// ---------------------------------------------------------------------------

#[test]
fn request_serialization_roundtrip() {
    let mut payload = Payload::new();
    payload.insert("data".to_string(), serde_json::json!({"rows": [1, 2, 3]}));

    let req = AgentRequest::new("ingest", payload)
        .with_request_id("r1")
        .with_priority(Priority::High)
        .with_correlation_id("trace-77");

    let json = serde_json::to_string(&req).unwrap();
    let parsed: AgentRequest = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.request_id, "r1");
    assert_eq!(parsed.capability, "ingest");
    assert_eq!(parsed.priority, Priority::High);
    assert_eq!(parsed.timeout_secs, 30);
    assert_eq!(parsed.correlation_id.as_deref(), Some("trace-77"));
    assert_eq!(parsed.created_at, req.created_at);
    assert_eq!(parsed.payload["data"]["rows"], serde_json::json!([1, 2, 3]));
}

// ---------------------------------------------------------------------------
// 2. Requests parsed from caller JSON pick up defaults for omitted fields
// ---------------------------------------------------------------------------

#[test]
fn request_from_wire_json_applies_defaults() {
    let parsed: AgentRequest = serde_json::from_str(
        r#"{
            "request_id": "r9",
            "capability": "scoring",
            "payload": {"model": "v2"},
            "created_at": "2026-03-01T12:00:00Z"
        }"#,
    )
    .unwrap();

    assert_eq!(parsed.priority, Priority::Normal);
    assert_eq!(parsed.timeout_secs, 30);
    assert!(parsed.correlation_id.is_none());
    assert!(parsed.is_dispatchable());
}

// ---------------------------------------------------------------------------
// 3. Terminal responses hold exactly one of result / (error, error_code)
// ---------------------------------------------------------------------------

#[test]
fn terminal_response_exactly_one_of() {
    let req = AgentRequest::new("ingest", Payload::new()).with_request_id("r2");

    let completed = AgentResponse::completed(&req, Payload::new(), 0.5);
    assert!(completed.status.is_terminal());
    assert!(completed.result.is_some() && completed.error.is_none());

    let failed = AgentResponse::failed(&req, ErrorCode::OrchestratorError, "agent raised", 1.5);
    assert!(failed.status.is_terminal());
    assert!(failed.result.is_none() && failed.error.is_some() && failed.error_code.is_some());

    let timed_out = AgentResponse::timed_out(&req, "attempt exceeded 30s", 30.2);
    assert!(timed_out.status.is_terminal());
    assert!(timed_out.result.is_none() && timed_out.error.is_some());
    assert_eq!(timed_out.error_code, Some(ErrorCode::Timeout));
}

// ---------------------------------------------------------------------------
// 4. Wire form of a failed response matches what status endpoints expose
// ---------------------------------------------------------------------------

#[test]
fn failed_response_wire_shape() {
    let req = AgentRequest::new("unknown-agent", Payload::new()).with_request_id("r3");
    let resp = AgentResponse::failed(
        &req,
        ErrorCode::AgentNotFound,
        "Agent not found for capability 'unknown-agent'",
        0.0,
    );

    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["status"], serde_json::json!("failed"));
    assert_eq!(value["error_code"], serde_json::json!("AGENT_NOT_FOUND"));
    assert_eq!(value["request_id"], serde_json::json!("r3"));
    assert!(value.get("result").is_none());

    let parsed: AgentResponse = serde_json::from_value(value).unwrap();
    assert_eq!(parsed.error_code, Some(ErrorCode::AgentNotFound));
    assert_eq!(parsed.status, ResponseStatus::Failed);
}
