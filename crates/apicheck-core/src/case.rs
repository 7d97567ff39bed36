//! Validated test cases

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Parse a method name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Methods where a request body is unusual
    #[must_use]
    pub const fn is_bodiless(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`
    Json(serde_json::Value),
    /// Sent verbatim
    Text(String),
}

impl RequestBody {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
        }
    }
}

/// A single configured HTTP request with its expected outcome.
///
/// Only built by [`crate::Config::cases`], so every instance has an absolute
/// http(s) URL and a plausible expected status.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub method: Method,
    pub url: String,
    pub expected_status: u16,
    /// Extra statuses that also count as a pass
    pub also_accept: Vec<u16>,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

impl TestCase {
    /// Whether `status` satisfies this case.
    #[must_use]
    pub fn accepts(&self, status: u16) -> bool {
        status == self.expected_status || self.also_accept.contains(&status)
    }

    /// "GET http://host/users"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}
