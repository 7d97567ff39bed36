//! apicheck-core: Core types, config and reporting for API checks
//!
//! This crate defines the test cases a run executes, the results it records,
//! and the report generator that turns a run summary into
//! `api_test_results.json` and `api_test_report.html`.

pub mod case;
pub mod check;
pub mod config;
pub mod report;
pub mod result;
pub mod schema;

pub use case::{Method, RequestBody, TestCase};
pub use check::{CheckPlan, ValidationStatus};
pub use config::{Config, ConfigError, TestDef};
pub use report::{REPORT_FILE, RESULTS_FILE, ReportError, ReportPaths, write_reports};
pub use result::{FailureKind, NO_RESPONSE_STATUS, RunSummary, TestResult};
