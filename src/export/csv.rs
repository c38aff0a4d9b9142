//! CSV export functionality.
//!
//! One header row, then one row per record. UTF-8 without a byte order mark,
//! comma delimited, quoting only where a value needs it.

use std::io::Write;

use csv::Writer;

use crate::flatten::FlatTable;

/// Writes `table` as CSV.
///
/// # Returns
///
/// Returns the number of records written (excluding the header).
pub fn write_csv<W: Write>(table: &FlatTable, out: W) -> csv::Result<usize> {
    let mut writer = Writer::from_writer(out);

    writer.write_record(&table.columns)?;

    let mut record_count = 0;
    for row in table.rows() {
        writer.write_record(&row)?;
        record_count += 1;
    }

    writer.flush()?;
    Ok(record_count)
}
