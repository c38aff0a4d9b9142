//! Error type definitions.
//!
//! This module defines the error kinds a conversion run can end with, plus the
//! warning types counted while a run succeeds.

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// A configuration value that failed validation.
///
/// Carries the offending field name so callers can point the user at the
/// exact flag to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ConfigValidationError {
    /// Name of the field (or CLI flag) that failed validation
    pub field: &'static str,
    /// Human-readable explanation with the expected format
    pub message: String,
}

/// Errors that terminate a conversion run.
///
/// None of these are retried; each maps to a distinct process exit code via
/// [`ConversionError::exit_code`].
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Options were rejected before the archive was opened.
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    /// The input is not a readable `.apkg` package.
    #[error("Invalid archive {}: {reason}", .path.display())]
    InvalidArchive {
        /// Path of the archive that failed to open
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// The collection database is missing tables, columns or model definitions.
    #[error("Malformed collection: {0}")]
    MalformedCollection(String),

    /// The active filters removed every row.
    #[error("No records match {}", describe_filters(.note_type.as_deref(), .card_type.as_deref()))]
    NoMatchingRecords {
        /// Note type filter in effect, if any
        note_type: Option<String>,
        /// Card type filter in effect, if any
        card_type: Option<String>,
    },

    /// The output table or a media file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    IoWriteError {
        /// Destination that could not be written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl From<sqlx::Error> for ConversionError {
    fn from(e: sqlx::Error) -> Self {
        ConversionError::MalformedCollection(e.to_string())
    }
}

fn describe_filters(note_type: Option<&str>, card_type: Option<&str>) -> String {
    match (note_type, card_type) {
        (Some(n), Some(c)) => format!("note type '{n}' and card type '{c}'"),
        (Some(n), None) => format!("note type '{n}'"),
        (None, Some(c)) => format!("card type '{c}'"),
        (None, None) => "the collection (it contains no notes)".to_string(),
    }
}

/// Coarse classification of a [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// Options failed validation (exit code 1)
    Config,
    /// Input is not a readable package (exit code 2)
    InvalidArchive,
    /// Collection database could not be decoded (exit code 3)
    MalformedCollection,
    /// Filters left no rows (exit code 4)
    NoMatchingRecords,
    /// Output could not be written (exit code 5)
    IoWriteError,
}

impl ErrorKind {
    /// Process exit code reported for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Config => 1,
            ErrorKind::InvalidArchive => 2,
            ErrorKind::MalformedCollection => 3,
            ErrorKind::NoMatchingRecords => 4,
            ErrorKind::IoWriteError => 5,
        }
    }

    /// Returns a human-readable string representation of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "Invalid configuration",
            ErrorKind::InvalidArchive => "Invalid archive",
            ErrorKind::MalformedCollection => "Malformed collection",
            ErrorKind::NoMatchingRecords => "No matching records",
            ErrorKind::IoWriteError => "Output write error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConversionError {
    /// Classifies the error for reporting and exit codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Config(_) => ErrorKind::Config,
            ConversionError::InvalidArchive { .. } => ErrorKind::InvalidArchive,
            ConversionError::MalformedCollection(_) => ErrorKind::MalformedCollection,
            ConversionError::NoMatchingRecords { .. } => ErrorKind::NoMatchingRecords,
            ConversionError::IoWriteError { .. } => ErrorKind::IoWriteError,
        }
    }

    /// Shorthand for `self.kind().exit_code()`.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    pub(crate) fn invalid_archive(path: &std::path::Path, reason: impl Into<String>) -> Self {
        ConversionError::InvalidArchive {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io_write(path: &std::path::Path, source: std::io::Error) -> Self {
        ConversionError::IoWriteError {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Types of recoverable anomalies seen during a conversion.
///
/// None of these stop the run; they are counted and summarized at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// Note had fewer values than its note type has fields
    PaddedFields,
    /// Note had more values than its note type has fields
    TruncatedFields,
    /// `[sound:...]` or `<img>` pointing at a file not in the package
    UnresolvedMediaRef,
    /// Manifest entry without a matching archive member
    MissingMediaBlob,
    /// Manifest entry whose file name is already taken by an earlier entry
    DuplicateMediaName,
    /// Value exceeded the XLSX cell size limit
    TruncatedCell,
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::PaddedFields => "Notes padded to note type field count",
            WarningType::TruncatedFields => "Notes with extra field values dropped",
            WarningType::UnresolvedMediaRef => "Unresolved media references",
            WarningType::MissingMediaBlob => "Media files missing from package",
            WarningType::DuplicateMediaName => "Media files skipped for duplicate names",
            WarningType::TruncatedCell => "Cells truncated to XLSX limit",
        }
    }
}
