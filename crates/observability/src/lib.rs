//! Tracing/logging setup shared by every entry point of the console.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogConfig, init};
