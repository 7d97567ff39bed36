//! Human-readable run summary for the terminal

use apicheck_core::result::format_pct;
use apicheck_core::{NO_RESPONSE_STATUS, ReportPaths, RunSummary};

const RULE: &str = "======================================================================";

pub fn render_summary(summary: &RunSummary, paths: &ReportPaths) -> String {
    let mut lines = Vec::new();

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push("TEST SUMMARY".to_string());
    lines.push(RULE.to_string());
    lines.push(format!("Total Tests: {}", summary.total_count));
    lines.push(format!("Passed: {}", summary.pass_count));
    lines.push(format!("Failed: {}", summary.fail_count));

    if summary.total_count > 0 {
        lines.push(format!(
            "Success Rate: {}%",
            format_pct(summary.success_rate())
        ));

        lines.push(String::new());
        lines.push("HTTP Status Code Distribution:".to_string());
        for (code, count) in &summary.status_distribution {
            let label = if *code == NO_RESPONSE_STATUS {
                "no response".to_string()
            } else {
                code.to_string()
            };
            lines.push(format!("   {label}: {count} requests"));
        }
    }

    if summary.fail_count > 0 {
        lines.push(String::new());
        lines.push("Failed Tests:".to_string());
        for r in summary.failures() {
            lines.push(format!("   - {} {} ({})", r.method, r.url, r.name));
            let status = if r.actual_status == NO_RESPONSE_STATUS {
                "no response".to_string()
            } else {
                r.actual_status.to_string()
            };
            let kind = r
                .failure_kind
                .map(|k| k.description().to_string())
                .unwrap_or_default();
            lines.push(format!(
                "     Status: {status} | {kind} | {}",
                r.detail().unwrap_or("")
            ));
        }
    }

    if summary.pass_count > 0 {
        lines.push(String::new());
        lines.push("Passed Tests:".to_string());
        for r in summary.results.iter().filter(|r| r.passed) {
            match &r.message {
                Some(message) => lines.push(format!(
                    "   - {} {} ({}) - {message}",
                    r.method, r.url, r.name
                )),
                None => lines.push(format!("   - {} {} ({})", r.method, r.url, r.name)),
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("Results: {}", paths.results.display()));
    lines.push(format!("Report:  {}", paths.report.display()));
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicheck_core::{FailureKind, Method, TestResult};
    use std::path::PathBuf;

    fn result(name: &str, status: u16, passed: bool) -> TestResult {
        TestResult {
            name: name.into(),
            method: Method::Get,
            url: format!("http://localhost:5000/{}", name.to_lowercase()),
            expected_status: 200,
            also_accepted: vec![],
            actual_status: status,
            passed,
            latency_ms: 10.0,
            error_message: None,
            failure_kind: None,
            message: None,
            response_body: None,
            timestamp: String::new(),
        }
    }

    fn paths() -> ReportPaths {
        ReportPaths {
            results: PathBuf::from("out/api_test_results.json"),
            report: PathBuf::from("out/api_test_report.html"),
        }
    }

    #[test]
    fn summary_lists_counts_distribution_and_failures() {
        let mut users = result("Users", 200, true);
        users.message = Some("Users fetched".into());
        let mut down = result("Down", NO_RESPONSE_STATUS, false);
        down.failure_kind = Some(FailureKind::Connection);
        down.error_message = Some("connection refused".into());
        let summary = RunSummary::from_results(vec![users, down], 12.0);

        let text = render_summary(&summary, &paths());

        assert!(text.contains("Total Tests: 2"));
        assert!(text.contains("Passed: 1"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("Success Rate: 50.0%"));
        assert!(text.contains("   no response: 1 requests"));
        assert!(text.contains("   200: 1 requests"));
        assert!(text.contains("   - GET http://localhost:5000/down (Down)"));
        assert!(text.contains("Status: no response | Could not connect | connection refused"));
        assert!(text.contains("(Users) - Users fetched"));
        assert!(text.contains("Results: out/api_test_results.json"));
    }

    #[test]
    fn empty_summary_omits_sections() {
        let summary = RunSummary::from_results(vec![], 0.0);
        let text = render_summary(&summary, &paths());
        assert!(text.contains("Total Tests: 0"));
        assert!(!text.contains("Success Rate"));
        assert!(!text.contains("Failed Tests:"));
        assert!(!text.contains("Passed Tests:"));
    }
}
