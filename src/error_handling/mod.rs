//! Error handling and conversion statistics.
//!
//! This module provides:
//! - The error kinds a run can terminate with, and their exit codes
//! - Configuration validation errors
//! - Warning counters for anomalies a run recovers from
//!
//! Errors are never retried: the converter is a single-shot batch tool and a
//! failure at any stage aborts the run.

mod stats;
mod types;

// Re-export public API
pub use stats::{log_conversion_statistics, ConversionStats};
pub use types::{
    ConfigValidationError, ConversionError, ErrorKind, InitializationError, WarningType,
};
