//! Suite configuration: endpoints to check and how to reach them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::case::{Method, RequestBody, TestCase};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Files tried by [`Config::load_default`], in order
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "apicheck.toml",
    ".apicheck.toml",
    "apicheck.json",
    "apicheck.yaml",
];

/// Suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Prefix for tests that give a `path` instead of a full `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Exit non-zero when any test fails
    #[serde(default)]
    pub fail_on_failure: bool,

    /// Directory for the JSON and HTML artifacts (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Static headers sent with every test (auth tokens, API keys, etc.)
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Test definitions, executed in order
    #[serde(default)]
    pub tests: Vec<TestDef>,
}

/// One `[[tests]]` entry as written in the config file.
///
/// Converted into a [`TestCase`] by [`Config::cases`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDef {
    pub name: String,

    /// GET, POST, PUT, PATCH or DELETE (any case)
    pub method: String,

    /// Absolute URL. Exclusive with `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Path appended to `base_url`. Exclusive with `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub expected_status: u16,

    /// Additional statuses treated as a pass
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_accept: Vec<u16>,

    /// Per-test headers, override suite headers with the same name
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// JSON request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,

    /// Raw request body. Exclusive with `body`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fail_on_failure: false,
            output_dir: None,
            headers: HashMap::new(),
            tests: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from file. Format is chosen by extension:
    /// `.json` → JSON, `.yaml`/`.yml` → YAML, anything else → TOML.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
            "yaml" | "yml" => {
                serde_yml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            _ => toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Load from the first existing file in [`DEFAULT_CONFIG_FILES`]
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if none exists, or any load error
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_default_in(Path::new("."))
    }

    /// Like [`Config::load_default`], relative to `dir`
    pub fn load_default_in(dir: &Path) -> Result<Self, ConfigError> {
        for name in DEFAULT_CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(ConfigError::NotFound(DEFAULT_CONFIG_FILES.join(", ")))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate every test definition and build the run's test cases.
    ///
    /// All-or-nothing: the first malformed entry aborts with
    /// [`ConfigError::Invalid`] so no request is sent for a broken suite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the offending entry
    pub fn cases(&self) -> Result<Vec<TestCase>, ConfigError> {
        if self.tests.is_empty() {
            return Err(ConfigError::Invalid("no tests defined".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        self.tests
            .iter()
            .enumerate()
            .map(|(idx, def)| self.build_case(idx, def))
            .collect()
    }

    fn build_case(&self, idx: usize, def: &TestDef) -> Result<TestCase, ConfigError> {
        let label = if def.name.trim().is_empty() {
            format!("tests[{idx}]")
        } else {
            format!("tests[{idx}] '{}'", def.name)
        };
        let invalid = |reason: String| ConfigError::Invalid(format!("{label}: {reason}"));

        if def.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }

        let method = Method::parse(&def.method)
            .ok_or_else(|| invalid(format!("unsupported method '{}'", def.method)))?;

        let url = self.resolve_url(def).map_err(&invalid)?;

        for &status in std::iter::once(&def.expected_status).chain(&def.also_accept) {
            if !(100..=599).contains(&status) {
                return Err(invalid(format!("status {status} is not a valid HTTP status")));
            }
        }

        let body = match (&def.body, &def.body_text) {
            (Some(_), Some(_)) => {
                return Err(invalid("set either body or body_text, not both".into()));
            }
            (Some(json), None) => Some(RequestBody::Json(json.clone())),
            (None, Some(text)) => Some(RequestBody::Text(text.clone())),
            (None, None) => None,
        };

        let headers = merge_headers(&self.headers, &def.headers);
        validate_headers(&headers).map_err(&invalid)?;

        Ok(TestCase {
            name: def.name.clone(),
            method,
            url,
            expected_status: def.expected_status,
            also_accept: def.also_accept.clone(),
            headers,
            body,
        })
    }

    fn resolve_url(&self, def: &TestDef) -> Result<String, String> {
        let raw = match (&def.url, &def.path) {
            (Some(_), Some(_)) => return Err("set either url or path, not both".into()),
            (None, None) => return Err("one of url or path is required".into()),
            (Some(url), None) => url.clone(),
            (None, Some(path)) => {
                let base = self
                    .base_url
                    .as_deref()
                    .ok_or_else(|| format!("path '{path}' needs base_url to be set"))?;
                join_url(base, path)
            }
        };

        let parsed = url::Url::parse(&raw).map_err(|e| format!("invalid url '{raw}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "url '{raw}' must use http or https, not '{}'",
                parsed.scheme()
            ));
        }
        Ok(raw)
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apicheck configuration

# Prefix for tests that use `path`
base_url = "http://localhost:5000"

# Per-request timeout in seconds
timeout_secs = 10

# Exit with code 1 when any test fails (for CI)
# fail_on_failure = true

# Where api_test_results.json and api_test_report.html are written
# output_dir = "reports"

# Static headers sent with every request
[headers]
Accept = "application/json"
# Authorization = "Bearer your-token-here"

[[tests]]
name = "Health"
method = "GET"
path = "/"
expected_status = 200

[[tests]]
name = "Sign up"
method = "POST"
path = "/api/v1/auth/signup"
expected_status = 201
also_accept = [200]
body = { fullName = "Test User", email = "testuser@example.com", password = "TestPassword123@!" }

[[tests]]
name = "Sign in"
method = "POST"
path = "/api/v1/auth/signin"
expected_status = 200
body = { email = "testuser@example.com", password = "TestPassword123@!" }

# [[tests]]
# name = "Change password"
# method = "PATCH"
# url = "http://localhost:5000/api/v1/auth/change-password"
# expected_status = 200
# body_text = '{"oldPassword":"a","newPassword":"b"}'
# [tests.headers]
# Content-Type = "application/json"
"#
    }
}

/// Suite headers overlaid by per-test headers. Names compare
/// case-insensitively, so `authorization` replaces a suite `Authorization`.
fn merge_headers(
    suite: &HashMap<String, String>,
    per_test: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged: HashMap<String, String> = suite
        .iter()
        .filter(|(name, _)| !per_test.keys().any(|own| own.eq_ignore_ascii_case(name)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(per_test.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

fn validate_headers(headers: &HashMap<String, String>) -> Result<(), String> {
    let mut names: Vec<_> = headers.keys().collect();
    names.sort();
    for name in names {
        http::HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| format!("header name '{name}' is not a valid HTTP header name"))?;
        http::HeaderValue::from_str(&headers[name])
            .map_err(|_| format!("header '{name}' has a value that is not valid in HTTP"))?;
    }
    let mut lowered: Vec<String> = headers.keys().map(|k| k.to_ascii_lowercase()).collect();
    lowered.sort();
    if let Some(pair) = lowered.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(format!("header '{}' is set more than once", pair[0]));
    }
    Ok(())
}

/// `"http://host/api/"` + `"/users"` → `"http://host/api/users"`
fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No config file found (tried {0})")]
    NotFound(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
