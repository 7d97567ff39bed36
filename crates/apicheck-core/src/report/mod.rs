//! Report artifacts: results JSON and HTML dashboard
//!
//! Both files land in one directory under fixed names, replacing the output
//! of the previous run.
//!
//! ```text
//! <output_dir>/
//! ├── api_test_results.json
//! └── api_test_report.html
//! ```

pub mod html;

use std::path::{Path, PathBuf};

use crate::result::RunSummary;

/// Results JSON file name
pub const RESULTS_FILE: &str = "api_test_results.json";

/// HTML report file name
pub const REPORT_FILE: &str = "api_test_report.html";

/// Where the artifacts of one run were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub results: PathBuf,
    pub report: PathBuf,
}

/// Write both artifacts into `dir`, creating it if missing.
///
/// # Errors
///
/// Returns error if the directory cannot be created or a file cannot be written.
pub fn write_reports(summary: &RunSummary, dir: &Path) -> Result<ReportPaths, ReportError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ReportError::Io(format!("create {}: {e}", dir.display())))?;

    let paths = ReportPaths {
        results: dir.join(RESULTS_FILE),
        report: dir.join(REPORT_FILE),
    };
    write_results_json(summary, &paths.results)?;
    write_html(summary, &paths.report)?;
    Ok(paths)
}

/// Serialize the summary as pretty UTF-8 JSON.
pub fn write_results_json(summary: &RunSummary, path: &Path) -> Result<(), ReportError> {
    let json =
        serde_json::to_string_pretty(summary).map_err(|e| ReportError::Serialize(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| ReportError::Io(format!("write {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), results = summary.results.len(), "wrote results json");
    Ok(())
}

/// Render and write the HTML report.
pub fn write_html(summary: &RunSummary, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, html::render(summary))
        .map_err(|e| ReportError::Io(format!("write {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "wrote html report");
    Ok(())
}

/// Read a results JSON written by [`write_results_json`].
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a run summary.
pub fn load_summary(path: &Path) -> Result<RunSummary, ReportError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReportError::Io(format!("read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| ReportError::Parse(format!("{}: {e}", path.display())))
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::fixtures::scenario;

    #[test]
    fn writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_reports(&scenario(), dir.path()).unwrap();

        assert_eq!(paths.results, dir.path().join("api_test_results.json"));
        assert_eq!(paths.report, dir.path().join("api_test_report.html"));
        assert!(paths.results.exists());
        assert!(paths.report.exists());

        let html = std::fs::read_to_string(&paths.report).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn results_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let summary = scenario();
        let paths = write_reports(&summary, dir.path()).unwrap();

        let loaded = load_summary(&paths.results).unwrap();
        assert_eq!(loaded, summary);
        assert_eq!(
            loaded.pass_count + loaded.fail_count,
            loaded.total_count
        );
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("latest");
        write_reports(&scenario(), &nested).unwrap();
        assert!(nested.join(RESULTS_FILE).exists());
    }

    #[test]
    fn overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        write_reports(&scenario(), dir.path()).unwrap();

        let empty = RunSummary::from_results(vec![], 0.0);
        let paths = write_reports(&empty, dir.path()).unwrap();

        let loaded = load_summary(&paths.results).unwrap();
        assert_eq!(loaded.total_count, 0);
        assert!(loaded.results.is_empty());
    }

    #[test]
    fn load_rejects_non_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESULTS_FILE);
        std::fs::write(&path, r#"[{"endpoint":"/","success":true}]"#).unwrap();
        assert!(matches!(load_summary(&path), Err(ReportError::Parse(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_summary(&missing), Err(ReportError::Io(_))));
    }
}
