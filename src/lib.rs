//! apkg_export library: flattens Anki `.apkg` packages into tables
//!
//! This library opens an `.apkg` deck package, reads the collection database
//! inside it, and writes one row per note (or per card) to CSV or XLSX, with
//! HTML stripped from field values.
//!
//! # Example
//!
//! ```no_run
//! use apkg_export::{Config, run_conversion};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input: std::path::PathBuf::from("french.apkg"),
//!     note_type: Some("Basic".to_string()),
//!     ..Default::default()
//! };
//!
//! let report = run_conversion(&config).await?;
//! println!("Wrote {} rows to {}", report.rows_written, report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The collection database is read through sqlx, so library functions must be
//! awaited inside a Tokio runtime. A `current_thread` runtime is enough.

#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod archive;
#[allow(missing_docs)]
pub mod collection;
#[allow(missing_docs)]
pub mod config;
mod error_handling;
#[allow(missing_docs)]
pub mod export;
#[allow(missing_docs)]
pub mod flatten;
pub mod initialization;
#[allow(missing_docs)]
pub mod media;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, OutputFormat, RowGranularity};
pub use error_handling::{
    ConfigValidationError, ConversionError, ConversionStats, ErrorKind, InitializationError,
    WarningType,
};
pub use flatten::{FlatTable, NoteTypeSummary};
pub use run::{list_note_types, run_conversion, ConversionReport};

// Internal run module (the conversion pipeline)
mod run {
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    use log::{info, warn};

    use crate::archive::ApkgArchive;
    use crate::collection::{read_collection, Collection};
    use crate::config::{Config, OutputFormat};
    use crate::error_handling::{log_conversion_statistics, ConversionError, ConversionStats};
    use crate::export::{write_table, ExportOptions};
    use crate::flatten::{self, FlattenOptions, NoteTypeSummary};
    use crate::media::{extract_media, read_manifest, MediaMap};

    /// Results of a conversion run.
    #[derive(Debug, Clone)]
    pub struct ConversionReport {
        /// Archive that was converted
        pub input: PathBuf,
        /// Table that was written
        pub output: PathBuf,
        /// Format of the written table
        pub format: OutputFormat,
        /// Data rows written (excluding the header)
        pub rows_written: usize,
        /// Header of the written table
        pub columns: Vec<String>,
        /// Media files extracted next to the table
        pub media_files: usize,
        /// Recoverable anomalies counted during the run
        pub warnings: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Converts one `.apkg` package into a CSV or XLSX table.
    ///
    /// Stages run strictly in order: open the archive, extract and read the
    /// collection, plan media, flatten, then write. Nothing is written until
    /// the table is known to have at least one row.
    ///
    /// # Errors
    ///
    /// - `ConversionError::Config` if the options are invalid
    /// - `ConversionError::InvalidArchive` if the input is not a readable package
    /// - `ConversionError::MalformedCollection` if the collection cannot be decoded
    /// - `ConversionError::NoMatchingRecords` if the filters leave no rows
    /// - `ConversionError::IoWriteError` if the table or media cannot be written
    pub async fn run_conversion(config: &Config) -> Result<ConversionReport, ConversionError> {
        let start_time = Instant::now();
        config.validate()?;
        let (output, format) = config.resolve_output();

        let stats = ConversionStats::new();
        let mut archive = ApkgArchive::open(&config.input)?;
        let collection = load_collection(&mut archive, &stats).await?;

        let media = if config.media {
            match read_manifest(&mut archive)? {
                Some(manifest) => Some(MediaMap::plan(&archive, &manifest, &stats)),
                None => {
                    warn!("No usable media manifest; media references are left as they are");
                    None
                }
            }
        } else {
            None
        };

        let options = FlattenOptions {
            granularity: config.granularity(),
            note_type: config.note_type.as_deref(),
            card_type: config.card_type.as_deref(),
            media: media.as_ref(),
        };
        let table = flatten::flatten(&collection, &options, &stats)?;
        info!(
            "Flattened {} notes into {} rows ({} columns)",
            collection.notes.len(),
            table.len(),
            table.columns.len()
        );

        if table.is_empty() {
            return Err(ConversionError::NoMatchingRecords {
                note_type: config.note_type.clone(),
                card_type: config.card_type.clone(),
            });
        }

        let media_files = match &media {
            Some(media) => extract_media(&mut archive, media, output_dir(&output))?,
            None => 0,
        };

        let export = ExportOptions::new(output, format);
        let rows_written = write_table(&table, &export, &stats)?;

        log_conversion_statistics(&stats);
        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        info!("Conversion finished in {:.2}s", elapsed_seconds);

        Ok(ConversionReport {
            input: config.input.clone(),
            output: export.output,
            format,
            rows_written,
            columns: table.columns,
            media_files,
            warnings: stats.total_warnings(),
            elapsed_seconds,
        })
    }

    /// Lists the distinct note types in a package without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::InvalidArchive` or
    /// `ConversionError::MalformedCollection` when the package cannot be read.
    pub async fn list_note_types(input: &Path) -> Result<Vec<NoteTypeSummary>, ConversionError> {
        let stats = ConversionStats::new();
        let mut archive = ApkgArchive::open(input)?;
        let collection = load_collection(&mut archive, &stats).await?;
        Ok(flatten::list_note_types(&collection))
    }

    async fn load_collection(
        archive: &mut ApkgArchive,
        stats: &ConversionStats,
    ) -> Result<Collection, ConversionError> {
        let extracted = archive.extract_collection()?;
        // The temporary database is removed when `extracted` drops, after the
        // connection pool has been closed.
        let collection = read_collection(extracted.path(), stats).await?;
        Ok(collection)
    }

    fn output_dir(output: &Path) -> &Path {
        match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}
