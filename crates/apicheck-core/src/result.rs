//! Per-test results and the run summary

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::case::Method;

/// Status recorded when no HTTP response was received
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Why a test failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Response arrived with an unexpected status
    StatusMismatch,
    /// No response within the timeout
    Timeout,
    /// Connection refused, DNS or TLS failure
    Connection,
    /// Any other transport error (body, redirect, decode)
    Request,
}

impl FailureKind {
    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::StatusMismatch => "Unexpected status code",
            Self::Timeout => "Request timed out",
            Self::Connection => "Could not connect",
            Self::Request => "Request failed",
        }
    }

    /// CSS class / short tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusMismatch => "status_mismatch",
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Request => "request",
        }
    }

    /// Transport failures never produced a response
    #[must_use]
    pub const fn is_transport(self) -> bool {
        !matches!(self, Self::StatusMismatch)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Recorded outcome of one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    pub method: Method,
    pub url: String,
    pub expected_status: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_accepted: Vec<u16>,
    /// 0 when no response was received
    pub actual_status: u16,
    pub passed: bool,
    pub latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// `message` field of a JSON response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response body (truncated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    /// RFC 3339 time the request was sent
    #[serde(default)]
    pub timestamp: String,
}

impl TestResult {
    /// "200" or "200 / 201"
    #[must_use]
    pub fn expected_display(&self) -> String {
        std::iter::once(&self.expected_status)
            .chain(&self.also_accepted)
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Error message, else the server's message
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.error_message.as_deref().or(self.message.as_deref())
    }
}

/// Aggregate counts and ordered results for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_count: u64,
    pub pass_count: u64,
    pub fail_count: u64,
    /// RFC 3339 time the summary was built
    #[serde(default)]
    pub generated_at: String,
    /// Wall-clock duration of the whole run
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Observed status → count (0 = no response)
    #[serde(default)]
    pub status_distribution: BTreeMap<u16, u64>,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    /// Build a summary, deriving all counts from `results`.
    #[must_use]
    pub fn from_results(results: Vec<TestResult>, duration_ms: f64) -> Self {
        let total_count = results.len() as u64;
        let pass_count = results.iter().filter(|r| r.passed).count() as u64;

        let mut status_distribution: BTreeMap<u16, u64> = BTreeMap::new();
        for r in &results {
            *status_distribution.entry(r.actual_status).or_default() += 1;
        }

        Self {
            total_count,
            pass_count,
            fail_count: total_count - pass_count,
            generated_at: now_rfc3339(),
            duration_ms,
            base_url: None,
            status_distribution,
            results,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Pass ratio in `0.0..=1.0`; 0 for an empty run
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.pass_count as f64 / self.total_count as f64
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.fail_count == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// `"2026-02-05T19:30:00.123Z"`
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Percentage without trailing noise: 100 → "100", 1/3 → "33.3"
#[must_use]
pub fn format_pct(rate: f64) -> String {
    let pct = rate * 100.0;
    if pct == 0.0 || pct == 100.0 {
        format!("{pct:.0}")
    } else {
        format!("{pct:.1}")
    }
}

/// Compact status distribution: "0x1, 200x5, 401x2"
#[must_use]
pub fn format_distribution(dist: &BTreeMap<u16, u64>) -> String {
    dist.iter()
        .map(|(code, count)| format!("{code}x{count}"))
        .collect::<Vec<_>>()
        .join(", ")
}
