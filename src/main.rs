//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `apkg_export` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output and exit codes
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use apkg_export::initialization::init_logger_with;
use apkg_export::{list_note_types, run_conversion, Config, LogFormat, LogLevel, OutputFormat};

/// Convert an Anki .apkg deck into a CSV or XLSX table.
#[derive(Debug, Parser)]
#[command(name = "apkg_export", version, about)]
struct Cli {
    /// Path to the .apkg file
    input_file: PathBuf,

    /// Output file (default: <input_file>.csv, or .xlsx with --format xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format; wins over the output file's extension
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Only export notes of this note type
    #[arg(long, value_name = "NOTE_TYPE")]
    filter: Option<String>,

    /// Only export cards of this card type (implies --per-card)
    #[arg(long, value_name = "CARD_TYPE")]
    card_type: Option<String>,

    /// One row per card instead of one per note
    #[arg(long)]
    per_card: bool,

    /// List the note types in the package and exit
    #[arg(long)]
    list_types: bool,

    /// Extract media files next to the output and link references to them
    #[arg(long)]
    media: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            input: cli.input_file,
            output: cli.output,
            format: cli.format,
            note_type: cli.filter,
            card_type: cli.card_type,
            per_card: cli.per_card,
            media: cli.media,
            log_level: cli.log_level,
            log_format: cli.log_format,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    if cli.list_types {
        let input = cli.input_file;
        return match list_note_types(&input).await {
            Ok(types) => {
                println!("Available Note Types in '{}':", input.display());
                for note_type in types {
                    println!("- {}", note_type);
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("apkg_export error: {:#}", e);
                process::exit(e.exit_code());
            }
        };
    }

    let config = Config::from(cli);
    match run_conversion(&config).await {
        Ok(report) => {
            println!(
                "✅ Wrote {} row{} ({} columns) to {} in {:.1}s",
                report.rows_written,
                if report.rows_written == 1 { "" } else { "s" },
                report.columns.len(),
                report.output.display(),
                report.elapsed_seconds
            );
            if report.media_files > 0 {
                println!("Media files extracted: {}", report.media_files);
            }
            if report.warnings > 0 {
                println!("{} warning(s) during conversion - see log for details", report.warnings);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("apkg_export error: {:#}", e);
            process::exit(e.exit_code());
        }
    }
}
