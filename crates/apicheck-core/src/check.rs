//! Pre-flight check plan
//!
//! Describes what a run *would* send without sending anything.
//! Used for `--dry-run` and CI previews.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Config;
use crate::case::{Method, TestCase};

// ── Plan types ──

/// Complete plan: requests in execution order plus config validations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckPlan {
    pub requests: Vec<PlannedRequest>,
    pub timeout_secs: u64,
    pub validations: Vec<Validation>,
}

/// One request the run would send.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedRequest {
    pub name: String,
    pub method: Method,
    pub url: String,
    /// Expected status followed by any alternatives
    pub expected: Vec<u16>,
    /// Header names (values omitted, they may be secrets)
    pub headers: Vec<String>,
    /// "json", "text" or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl CheckPlan {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }

    /// Plain-text rendering for the terminal
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "Plan: {} requests (timeout {}s each)",
            self.requests.len(),
            self.timeout_secs
        ));
        lines.push(String::new());

        for (idx, req) in self.requests.iter().enumerate() {
            let expected = req
                .expected
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join("|");
            lines.push(format!(
                "  [{}] {} {} -> {} ({})",
                idx + 1,
                req.method,
                req.url,
                expected,
                req.name
            ));
            if !req.headers.is_empty() {
                lines.push(format!("        headers: {}", req.headers.join(", ")));
            }
            if let Some(body) = &req.body {
                lines.push(format!("        body: {body}"));
            }
        }

        lines.push(String::new());
        lines.push("Validations:".to_string());
        for v in &self.validations {
            lines.push(format!("  [{}] {}", v.status, v.message));
        }
        lines.join("\n")
    }
}

// ── Building the plan ──

/// Patterns that suggest a placeholder value rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-token",
    "your_token",
    "YOUR_TOKEN",
    "your-api-key",
    "YOUR_API_KEY",
    "CHANGEME",
    "changeme",
    "placeholder",
    "replace-me",
    "REPLACE_ME",
];

/// Build the plan straight from a config. A suite that fails
/// [`Config::cases`] yields no requests and an Error validation instead
/// of an error, so a dry run can report every problem it finds.
#[must_use]
pub fn plan_config(config: &Config) -> CheckPlan {
    match config.cases() {
        Ok(cases) => plan(config, &cases),
        Err(err) => {
            let mut validations = validate_config(config);
            validations.push(Validation {
                check: "tests".into(),
                status: ValidationStatus::Error,
                message: err.to_string(),
            });
            CheckPlan {
                requests: Vec::new(),
                timeout_secs: config.timeout_secs,
                validations,
            }
        }
    }
}

/// Build the plan for already-validated cases.
#[must_use]
pub fn plan(config: &Config, cases: &[TestCase]) -> CheckPlan {
    let requests = cases
        .iter()
        .map(|case| {
            let mut headers: Vec<String> = case.headers.keys().cloned().collect();
            headers.sort();
            PlannedRequest {
                name: case.name.clone(),
                method: case.method,
                url: case.url.clone(),
                expected: std::iter::once(case.expected_status)
                    .chain(case.also_accept.iter().copied())
                    .collect(),
                headers,
                body: case.body.as_ref().map(|b| b.kind().to_string()),
            }
        })
        .collect();

    let mut validations = validate_config(config);
    validations.extend(validate_cases(config, cases));

    CheckPlan {
        requests,
        timeout_secs: config.timeout_secs,
        validations,
    }
}

/// Validate suite-level settings.
#[must_use]
pub fn validate_config(config: &Config) -> Vec<Validation> {
    let mut checks = Vec::new();

    match &config.base_url {
        None => checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Ok,
            message: "base_url: not set (tests use absolute urls)".into(),
        }),
        Some(base) if base.starts_with("http://") || base.starts_with("https://") => {
            checks.push(Validation {
                check: "base_url".into(),
                status: ValidationStatus::Ok,
                message: format!("base_url: {base}"),
            });
        }
        Some(base) => checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Warning,
            message: format!("base_url: {base} (missing http:// or https:// prefix)"),
        }),
    }

    checks.push(Validation {
        check: "timeout".into(),
        status: if config.timeout_secs == 0 {
            ValidationStatus::Error
        } else {
            ValidationStatus::Ok
        },
        message: format!("timeout: {}s", config.timeout_secs),
    });

    let header_issues = placeholder_issues(
        config
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    if header_issues.is_empty() {
        checks.push(Validation {
            check: "headers".into(),
            status: ValidationStatus::Ok,
            message: if config.headers.is_empty() {
                "headers: none configured".into()
            } else {
                format!("headers: {} configured", config.headers.len())
            },
        });
    } else {
        for issue in header_issues {
            checks.push(Validation {
                check: "headers".into(),
                status: ValidationStatus::Warning,
                message: issue,
            });
        }
    }

    checks
}

/// Validate built cases: duplicate names, unusual bodies, placeholder headers.
///
/// Headers inherited unchanged from `config` are left to [`validate_config`].
#[must_use]
pub fn validate_cases(config: &Config, cases: &[TestCase]) -> Vec<Validation> {
    let mut checks = Vec::new();

    let mut seen = HashSet::new();
    for case in cases {
        if !seen.insert(case.name.as_str()) {
            checks.push(Validation {
                check: "names".into(),
                status: ValidationStatus::Warning,
                message: format!("test name '{}' is used more than once", case.name),
            });
        }
        if case.body.is_some() && case.method.is_bodiless() {
            checks.push(Validation {
                check: "body".into(),
                status: ValidationStatus::Warning,
                message: format!(
                    "'{}': {} request has a body; many servers ignore it",
                    case.name, case.method
                ),
            });
        }
    }

    let mut reported = HashSet::new();
    for case in cases {
        for issue in placeholder_issues(
            case.headers
                .iter()
                .filter(|(k, v)| config.headers.get(k.as_str()) != Some(*v))
                .map(|(k, v)| (k.as_str(), v.as_str())),
        ) {
            if reported.insert(issue.clone()) {
                checks.push(Validation {
                    check: "headers".into(),
                    status: ValidationStatus::Warning,
                    message: format!("'{}': {issue}", case.name),
                });
            }
        }
    }

    checks.push(Validation {
        check: "tests".into(),
        status: ValidationStatus::Ok,
        message: format!("tests: {} defined", cases.len()),
    });

    checks
}

fn placeholder_issues<'a>(headers: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<String> {
    let mut issues = Vec::new();
    let mut sorted: Vec<_> = headers.collect();
    sorted.sort();
    for (key, value) in sorted {
        // Angle-bracket placeholders: <token>, <your-key>
        if value.contains('<') && value.contains('>') {
            issues.push(format!("{key}: contains '<...>' placeholder"));
            continue;
        }
        if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| value.contains(**p)) {
            issues.push(format!("{key}: contains '{pattern}', may be a placeholder"));
        }
    }
    issues
}
