//! Outcome evaluation: observed response (or transport failure) → TestResult
//!
//! Pure logic, no I/O.

use std::time::Duration;

use apicheck_core::{FailureKind, NO_RESPONSE_STATUS, TestCase, TestResult};

/// Response bodies above this size are truncated in results
pub const MAX_BODY_BYTES: usize = 4096;

/// What came back from the server
#[derive(Debug, Clone)]
pub struct Observed {
    pub status: u16,
    pub body: String,
}

/// Why no response was received
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub message: String,
}

pub type Outcome = Result<Observed, TransportFailure>;

/// Turn one request outcome into the case's result.
#[must_use]
pub fn evaluate(
    case: &TestCase,
    outcome: Outcome,
    latency: Duration,
    timestamp: String,
) -> TestResult {
    let (actual_status, passed, failure_kind, error_message, message, response_body) =
        match outcome {
            Ok(observed) => {
                let passed = case.accepts(observed.status);
                let (kind, error) = if passed {
                    (None, None)
                } else {
                    (
                        Some(FailureKind::StatusMismatch),
                        Some(mismatch_message(case, observed.status)),
                    )
                };
                (
                    observed.status,
                    passed,
                    kind,
                    error,
                    extract_message(&observed.body),
                    truncate_body(&observed.body),
                )
            }
            Err(failure) => (
                NO_RESPONSE_STATUS,
                false,
                Some(failure.kind),
                Some(failure.message),
                None,
                None,
            ),
        };

    TestResult {
        name: case.name.clone(),
        method: case.method,
        url: case.url.clone(),
        expected_status: case.expected_status,
        also_accepted: case.also_accept.clone(),
        actual_status,
        passed,
        latency_ms: latency_ms(latency),
        error_message,
        failure_kind,
        message,
        response_body,
        timestamp,
    }
}

fn mismatch_message(case: &TestCase, actual: u16) -> String {
    if case.also_accept.is_empty() {
        format!("expected {}, got {actual}", case.expected_status)
    } else {
        let expected = std::iter::once(case.expected_status)
            .chain(case.also_accept.iter().copied())
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        format!("expected {expected}, got {actual}")
    }
}

/// Milliseconds, rounded to microseconds
#[must_use]
pub fn latency_ms(latency: Duration) -> f64 {
    (latency.as_secs_f64() * 1_000_000.0).round() / 1000.0
}

/// `message` field of a JSON object body, as APIs commonly return
/// (`{"message": "Signup completed", "data": {...}}`).
#[must_use]
pub fn extract_message(body: &str) -> Option<String> {
    if !body.trim_start().starts_with('{') {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Keep at most [`MAX_BODY_BYTES`], cut at a char boundary.
#[must_use]
pub fn truncate_body(body: &str) -> Option<String> {
    if body.is_empty() {
        None
    } else if body.len() <= MAX_BODY_BYTES {
        Some(body.to_string())
    } else {
        let mut end = MAX_BODY_BYTES;
        while end > 0 && !body.is_char_boundary(end) {
            end -= 1;
        }
        Some(format!("{}…({} bytes total)", &body[..end], body.len()))
    }
}

/// `PASS | GET http://host/users | status 200 | Users fetched`
#[must_use]
pub fn log_line(result: &TestResult) -> String {
    let verdict = if result.passed { "PASS" } else { "FAIL" };
    let status = if result.actual_status == NO_RESPONSE_STATUS {
        "no response".to_string()
    } else {
        format!("status {}", result.actual_status)
    };
    let mut line = format!(
        "{verdict} | {} {} | {status} | {:.1} ms",
        result.method, result.url, result.latency_ms
    );
    if let Some(detail) = result.detail() {
        line.push_str(" | ");
        line.push_str(detail);
    }
    line
}
