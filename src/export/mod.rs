//! Table writer.
//!
//! Serializes a [`FlatTable`](crate::flatten::FlatTable) to CSV or XLSX. Both
//! formats go through [`write_atomically`], so a failed run never leaves a
//! partial table at the destination.

mod atomic;
mod csv;
mod types;
mod xlsx;

use log::info;

pub use atomic::write_atomically;
pub use csv::write_csv;
pub use types::ExportOptions;
pub use xlsx::write_xlsx;

use crate::config::{OutputFormat, RowGranularity, XLSX_CARDS_SHEET, XLSX_NOTES_SHEET};
use crate::error_handling::{ConversionError, ConversionStats};
use crate::flatten::FlatTable;

/// Writes `table` to `options.output` in `options.format`.
///
/// # Returns
///
/// Returns the number of records written (excluding the header).
///
/// # Errors
///
/// Returns `ConversionError::IoWriteError` if the destination cannot be
/// created or written.
pub fn write_table(
    table: &FlatTable,
    options: &ExportOptions,
    stats: &ConversionStats,
) -> Result<usize, ConversionError> {
    let written = match options.format {
        OutputFormat::Csv => write_atomically(&options.output, |out| {
            write_csv(table, out).map_err(std::io::Error::from)
        })?,
        OutputFormat::Xlsx => write_atomically(&options.output, |out| {
            write_xlsx(table, sheet_name(table.granularity), out, stats)
        })?,
    };

    info!(
        "Wrote {} rows x {} columns to {} ({})",
        written,
        table.columns.len(),
        options.output.display(),
        options.format
    );
    Ok(written)
}

fn sheet_name(granularity: RowGranularity) -> &'static str {
    match granularity {
        RowGranularity::Note => XLSX_NOTES_SHEET,
        RowGranularity::Card => XLSX_CARDS_SHEET,
    }
}
