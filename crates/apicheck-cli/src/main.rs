//! apicheck CLI - Run HTTP API checks and render JSON + HTML reports

mod logging;
mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use apicheck_core::report::{self, load_summary, write_html};
use apicheck_core::{Config, REPORT_FILE, RESULTS_FILE, RunSummary, check};
use apicheck_runner::Runner;

const INIT_CONFIG_FILE: &str = "apicheck.toml";

#[derive(Parser)]
#[command(name = "apicheck")]
#[command(about = "Run HTTP API checks and render JSON + HTML reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured API tests and write the reports
    Run {
        /// Config file (default: apicheck.toml, .apicheck.toml, apicheck.json, apicheck.yaml)
        #[arg(short, long)]
        config: Option<String>,

        /// Directory for api_test_results.json and api_test_report.html
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Per-request timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Show execution plan without sending requests
        #[arg(long)]
        dry_run: bool,

        /// Exit 1 when any test fails (for CI)
        #[arg(long)]
        fail_on_failure: bool,
    },

    /// Re-render the HTML report from a saved results file
    Render {
        /// Results file written by `run`
        #[arg(long, default_value = RESULTS_FILE)]
        results: String,

        /// Output directory (default: next to the results file)
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the results file
    Schema,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.output == OutputFormat::Silent);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Run {
            config,
            output_dir,
            timeout,
            dry_run,
            fail_on_failure,
        } => {
            let mut cfg = match &config {
                Some(path) => Config::load(Path::new(path))?,
                None => Config::load_default()?,
            };
            if let Some(secs) = timeout {
                cfg.timeout_secs = secs;
            }
            if dry_run {
                let plan = check::plan_config(&cfg);
                match cli.output {
                    OutputFormat::Terminal => println!("{}", plan.to_terminal()),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                    OutputFormat::Silent => {}
                }
                return Ok(u8::from(plan.has_errors()));
            }

            let cases = cfg.cases()?;

            let runner = Runner::from_config(&cfg)?;
            let start = Instant::now();
            let results = runner.run(&cases);
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

            let summary =
                RunSummary::from_results(results, duration_ms).with_base_url(cfg.base_url.clone());

            let dir = resolve_output_dir(output_dir.as_deref(), cfg.output_dir.as_deref());
            let paths = report::write_reports(&summary, &dir)
                .with_context(|| format!("writing reports to {}", dir.display()))?;

            tracing::info!(
                total = summary.total_count,
                passed = summary.pass_count,
                failed = summary.fail_count,
                "run complete"
            );

            match cli.output {
                OutputFormat::Terminal => print!("{}", terminal::render_summary(&summary, &paths)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Silent => {}
            }

            Ok(exit_code(&summary, fail_on_failure || cfg.fail_on_failure))
        }

        Commands::Render {
            results,
            output_dir,
        } => {
            let results = PathBuf::from(results);
            let summary = load_summary(&results)?;

            let dir = match output_dir {
                Some(dir) => PathBuf::from(dir),
                None => results
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let report = dir.join(REPORT_FILE);
            write_html(&summary, &report)?;

            if cli.output != OutputFormat::Silent {
                println!("Report: {}", report.display());
            }
            Ok(0)
        }

        Commands::Init => {
            let path = Path::new(INIT_CONFIG_FILE);
            if !write_example_config(path)? {
                eprintln!("{INIT_CONFIG_FILE} already exists");
                return Ok(1);
            }

            println!("Created {INIT_CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: server to test");
            println!("  - headers: auth tokens, API keys");
            println!("  - [[tests]]: one block per request");
            println!("\nThen run: apicheck run");
            Ok(0)
        }

        Commands::Schema => {
            let schema = apicheck_core::schema::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}

/// CLI flag, then config, then the working directory.
fn resolve_output_dir(flag: Option<&str>, config: Option<&Path>) -> PathBuf {
    flag.map(PathBuf::from)
        .or_else(|| config.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Failures only affect the exit code when gating is on.
fn exit_code(summary: &RunSummary, fail_on_failure: bool) -> u8 {
    u8::from(fail_on_failure && !summary.all_passed())
}

/// Returns `false` without touching an existing file.
fn write_example_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(path, Config::example())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicheck_core::{FailureKind, Method, TestResult};
    use clap::CommandFactory;

    fn result(passed: bool) -> TestResult {
        TestResult {
            name: "Users".into(),
            method: Method::Get,
            url: "http://localhost:5000/users".into(),
            expected_status: 200,
            also_accepted: vec![],
            actual_status: if passed { 200 } else { 500 },
            passed,
            latency_ms: 1.0,
            error_message: None,
            failure_kind: (!passed).then_some(FailureKind::StatusMismatch),
            message: None,
            response_body: None,
            timestamp: String::new(),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "apicheck",
            "--output",
            "json",
            "run",
            "-c",
            "suite.yaml",
            "-o",
            "out",
            "--timeout",
            "3",
            "--dry-run",
            "--fail-on-failure",
        ])
        .unwrap();
        assert!(cli.output == OutputFormat::Json);
        match cli.command {
            Commands::Run {
                config,
                output_dir,
                timeout,
                dry_run,
                fail_on_failure,
            } => {
                assert_eq!(config.as_deref(), Some("suite.yaml"));
                assert_eq!(output_dir.as_deref(), Some("out"));
                assert_eq!(timeout, Some(3));
                assert!(dry_run);
                assert!(fail_on_failure);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn render_defaults_to_results_file() {
        let cli = Cli::try_parse_from(["apicheck", "render"]).unwrap();
        match cli.command {
            Commands::Render {
                results,
                output_dir,
            } => {
                assert_eq!(results, RESULTS_FILE);
                assert_eq!(output_dir, None);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn output_dir_precedence() {
        assert_eq!(
            resolve_output_dir(Some("cli"), Some(Path::new("cfg"))),
            PathBuf::from("cli")
        );
        assert_eq!(
            resolve_output_dir(None, Some(Path::new("cfg"))),
            PathBuf::from("cfg")
        );
        assert_eq!(resolve_output_dir(None, None), PathBuf::from("."));
    }

    #[test]
    fn failures_gate_exit_code_only_when_enabled() {
        let failed = RunSummary::from_results(vec![result(true), result(false)], 1.0);
        let passed = RunSummary::from_results(vec![result(true)], 1.0);

        assert_eq!(exit_code(&failed, false), 0);
        assert_eq!(exit_code(&failed, true), 1);
        assert_eq!(exit_code(&passed, true), 0);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INIT_CONFIG_FILE);

        assert!(write_example_config(&path).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, Config::example());

        std::fs::write(&path, "# mine").unwrap();
        assert!(!write_example_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }
}
