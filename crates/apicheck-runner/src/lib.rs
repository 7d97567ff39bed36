//! apicheck-runner: executes API test cases over HTTP

pub mod http;

pub use http::{Runner, RunnerBuilder, RunnerError};
