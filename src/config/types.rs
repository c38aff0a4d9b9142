//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use strum_macros::EnumIter as EnumIterMacro;

use crate::error_handling::ConfigValidationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Output table format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, EnumIterMacro)]
pub enum OutputFormat {
    /// Comma-separated values, UTF-8
    Csv,
    /// Office Open XML spreadsheet
    Xlsx,
}

impl OutputFormat {
    /// File extension (without the dot) conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    /// Infers the format from a path's extension (case-insensitive).
    ///
    /// Returns `None` for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "xlsx" => Some(OutputFormat::Xlsx),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether the table has one row per note or one row per card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowGranularity {
    Note,
    Card,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without going through argument parsing.
///
/// # Examples
///
/// ```no_run
/// use apkg_export::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     input: PathBuf::from("deck.apkg"),
///     note_type: Some("Basic".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// The `.apkg` archive to convert
    pub input: PathBuf,

    /// Output path; defaults to the input path with the format's extension appended
    pub output: Option<PathBuf>,

    /// Explicit output format; wins over the output path's extension
    pub format: Option<OutputFormat>,

    /// Keep only notes of this note type
    pub note_type: Option<String>,

    /// Keep only cards generated by this template (implies card-level rows)
    pub card_type: Option<String>,

    /// Emit one row per card instead of one per note
    pub per_card: bool,

    /// Extract media next to the output and link references to it
    pub media: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("deck.apkg"),
            output: None,
            format: None,
            note_type: None,
            card_type: None,
            per_card: false,
            media: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Card-level rows are produced when asked for, or when filtering by card type.
    pub fn granularity(&self) -> RowGranularity {
        if self.per_card || self.card_type.is_some() {
            RowGranularity::Card
        } else {
            RowGranularity::Note
        }
    }

    /// Resolves the destination path and format.
    ///
    /// - No output and no format: `<input>.csv`
    /// - No output, explicit format: `<input>.<ext>`
    /// - Output only: format inferred from its extension, CSV when unknown
    /// - Both: the format wins and a mismatching extension is replaced
    pub fn resolve_output(&self) -> (PathBuf, OutputFormat) {
        match (&self.output, self.format) {
            (None, format) => {
                let format = format.unwrap_or(OutputFormat::Csv);
                (append_extension(&self.input, format.extension()), format)
            }
            (Some(path), None) => {
                let format = OutputFormat::from_path(path).unwrap_or(OutputFormat::Csv);
                (path.clone(), format)
            }
            (Some(path), Some(format)) => {
                if OutputFormat::from_path(path) == Some(format) {
                    (path.clone(), format)
                } else {
                    (path.with_extension(format.extension()), format)
                }
            }
        }
    }

    /// Validates option values before any file is opened.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigValidationError`] naming the offending option.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigValidationError {
                field: "input_file",
                message: "an .apkg path is required".to_string(),
            });
        }

        if matches!(&self.note_type, Some(name) if name.trim().is_empty()) {
            return Err(ConfigValidationError {
                field: "filter",
                message: "note type name must not be empty".to_string(),
            });
        }

        if matches!(&self.card_type, Some(name) if name.trim().is_empty()) {
            return Err(ConfigValidationError {
                field: "card-type",
                message: "card type name must not be empty".to_string(),
            });
        }

        let (output, _) = self.resolve_output();
        if output == self.input {
            return Err(ConfigValidationError {
                field: "output",
                message: "output path must differ from the input archive".to_string(),
            });
        }
        if output.is_dir() {
            return Err(ConfigValidationError {
                field: "output",
                message: format!("{} is a directory, expected a file path", output.display()),
            });
        }

        Ok(())
    }
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
