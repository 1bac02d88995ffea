//! Observability helpers for the Slack client.
//!
//! Provides span construction and secret redaction for log output.

pub mod logging;
pub mod tracing_utils;

pub use logging::*;
pub use tracing_utils::*;
