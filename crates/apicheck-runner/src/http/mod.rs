//! Blocking HTTP test runner
//!
//! Sends each case once, in order, with reqwest's blocking client and a
//! bounded timeout. Per-case failures are recorded in the case's result and
//! never abort the run.

pub mod checks;

use std::time::{Duration, Instant};

use apicheck_core::result::now_rfc3339;
use apicheck_core::{Config, FailureKind, Method, RequestBody, TestCase, TestResult};

use checks::{Observed, Outcome, TransportFailure, evaluate, log_line};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration =
    Duration::from_secs(apicheck_core::config::DEFAULT_TIMEOUT_SECS);

/// Executes test cases against live endpoints
#[derive(Debug, Clone)]
pub struct Runner {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

/// Builder for [`Runner`]
#[derive(Debug, Clone)]
pub struct RunnerBuilder {
    timeout: Duration,
    use_proxy: bool,
}

impl Default for RunnerBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            use_proxy: true,
        }
    }
}

impl RunnerBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ignore `HTTP_PROXY` and friends
    #[must_use]
    pub fn no_proxy(mut self) -> Self {
        self.use_proxy = false;
        self
    }

    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend init).
    pub fn build(self) -> Result<Runner, RunnerError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("apicheck/", env!("CARGO_PKG_VERSION")));
        if !self.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| RunnerError::Client(e.to_string()))?;
        Ok(Runner {
            client,
            timeout: self.timeout,
        })
    }
}

impl Runner {
    #[must_use]
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::default()
    }

    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, RunnerError> {
        Self::builder().timeout(config.timeout()).build()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run every case in order. Returns exactly one result per case, in the
    /// same order; the caller owns the collection.
    pub fn run(&self, cases: &[TestCase]) -> Vec<TestResult> {
        tracing::info!(
            tests = cases.len(),
            timeout_secs = self.timeout.as_secs_f64(),
            "running api tests"
        );

        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let result = self.execute_one(case);
            if result.passed {
                tracing::info!("{}", log_line(&result));
            } else {
                tracing::warn!("{}", log_line(&result));
            }
            results.push(result);
        }
        results
    }

    /// Send one case and evaluate what came back.
    pub fn execute_one(&self, case: &TestCase) -> TestResult {
        tracing::debug!(test = %case.name, "sending {}", case.label());
        let timestamp = now_rfc3339();
        let start = Instant::now();
        let outcome = self.send(case);
        let latency = start.elapsed();
        evaluate(case, outcome, latency, timestamp)
    }

    fn send(&self, case: &TestCase) -> Outcome {
        let mut req = self.client.request(to_reqwest(case.method), &case.url);
        for (k, v) in &case.headers {
            req = req.header(k, v);
        }
        match &case.body {
            Some(RequestBody::Json(value)) => req = req.json(value),
            Some(RequestBody::Text(text)) => req = req.body(text.clone()),
            None => {}
        }

        let resp = req.send().map_err(|e| transport_failure(&e))?;
        let status = resp.status().as_u16();

        // The timeout covers the body too; a stalled body is not a response
        let body = resp.text().map_err(|e| {
            tracing::debug!(test = %case.name, status, error = %e, "failed to read response body");
            let failure = transport_failure(&e);
            TransportFailure {
                message: format!("reading body after status {status}: {}", failure.message),
                ..failure
            }
        })?;

        Ok(Observed { status, body })
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport_failure(err: &reqwest::Error) -> TransportFailure {
    TransportFailure {
        kind: classify(err),
        message: describe(err),
    }
}

/// Timeout is checked first: a connect that times out is a timeout.
fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Connection
    } else {
        FailureKind::Request
    }
}

/// Error message with its source chain: "error sending request: ... : Connection refused"
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !parts.iter().any(|p| p.contains(&msg)) {
            parts.push(msg);
        }
        source = cause.source();
    }
    parts.join(": ")
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("HTTP client error: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1
                .as_deref()
                .map(|l| l as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn describe_joins_source_chain() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("Connection refused (os error 111)", None))),
            ))),
        );
        assert_eq!(
            describe(&err),
            "error sending request: client error (Connect): Connection refused (os error 111)"
        );
    }

    #[test]
    fn describe_skips_repeated_messages() {
        let err = Layer(
            "operation timed out",
            Some(Box::new(Layer("timed out", None))),
        );
        assert_eq!(describe(&err), "operation timed out");
    }

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(to_reqwest(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn builder_keeps_timeout() {
        let runner = Runner::builder()
            .timeout(Duration::from_millis(250))
            .no_proxy()
            .build()
            .unwrap();
        assert_eq!(runner.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn from_config_uses_config_timeout() {
        let config = Config {
            timeout_secs: 3,
            ..Config::default()
        };
        let runner = Runner::from_config(&config).unwrap();
        assert_eq!(runner.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn empty_suite_yields_no_results() {
        let runner = Runner::builder().no_proxy().build().unwrap();
        assert!(runner.run(&[]).is_empty());
    }
}
