//! Export types and options.

use std::path::PathBuf;

use crate::config::OutputFormat;

/// Where and how to write a flattened table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Destination file; replaced atomically
    pub output: PathBuf,
    /// Serialization format
    pub format: OutputFormat,
}

impl ExportOptions {
    pub fn new(output: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output: output.into(),
            format,
        }
    }
}
