//! JSON Schema for the results file
//!
//! Lets downstream tooling validate `api_test_results.json` without
//! depending on this crate.

use crate::result::RunSummary;

/// Generate the JSON Schema of [`RunSummary`] as pretty-printed JSON.
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunSummary);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
