//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (archive entry names, column labels, limits)
//! - Option types shared by the CLI and the library
//! - Validation and output path resolution

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, OutputFormat, RowGranularity};
