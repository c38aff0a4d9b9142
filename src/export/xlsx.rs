//! XLSX export functionality.
//!
//! Writes a minimal SpreadsheetML package: one worksheet of inline string
//! cells with a bold header row. No shared string table, no number typing.

use std::io::{self, Seek, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::XLSX_MAX_CELL_CHARS;
use crate::error_handling::{ConversionStats, WarningType};
use crate::flatten::FlatTable;

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIP_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 0 is the default; style 1 is bold, used for the header row.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const HEADER_STYLE: u8 = 1;

/// Writes `table` as a single-sheet XLSX workbook.
///
/// # Returns
///
/// Returns the number of records written (excluding the header).
pub fn write_xlsx<W: Write + Seek>(
    table: &FlatTable,
    sheet_name: &str,
    out: W,
    stats: &ConversionStats,
) -> io::Result<usize> {
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
        ("xl/styles.xml", STYLES_XML.to_string()),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).map_err(zip_to_io)?;
        zip.write_all(body.as_bytes())?;
    }

    zip.start_file("xl/worksheets/sheet1.xml", options)
        .map_err(zip_to_io)?;
    let record_count = write_sheet(&mut zip, table, stats)?;

    zip.finish().map_err(zip_to_io)?;
    Ok(record_count)
}

fn write_sheet<W: Write>(out: &mut W, table: &FlatTable, stats: &ConversionStats) -> io::Result<usize> {
    write!(
        out,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{SPREADSHEET_NS}"><sheetData>"#
    )?;

    let header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    write_row(out, 1, &header, Some(HEADER_STYLE), stats)?;

    let mut record_count = 0;
    for (i, row) in table.rows().enumerate() {
        write_row(out, i + 2, &row, None, stats)?;
        record_count += 1;
    }

    out.write_all(b"</sheetData></worksheet>")?;
    Ok(record_count)
}

fn write_row<W: Write>(
    out: &mut W,
    row_number: usize,
    cells: &[&str],
    style: Option<u8>,
    stats: &ConversionStats,
) -> io::Result<()> {
    write!(out, r#"<row r="{row_number}">"#)?;
    for (col, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let reference = format!("{}{}", column_letters(col), row_number);
        match style {
            Some(s) => write!(out, r#"<c r="{reference}" s="{s}" t="inlineStr">"#)?,
            None => write!(out, r#"<c r="{reference}" t="inlineStr">"#)?,
        }
        let text = cell_text(value, stats);
        write!(out, r#"<is><t xml:space="preserve">{text}</t></is></c>"#)?;
    }
    out.write_all(b"</row>")
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{SPREADSHEET_NS}" xmlns:r="{RELATIONSHIP_NS}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(sheet_name)
    )
}

/// Escaped cell content, truncated to the Excel cell limit.
fn cell_text(value: &str, stats: &ConversionStats) -> String {
    let char_count = value.chars().count();
    if char_count > XLSX_MAX_CELL_CHARS {
        stats.increment_warning(WarningType::TruncatedCell);
        let truncated: String = value.chars().take(XLSX_MAX_CELL_CHARS).collect();
        escape_xml(&truncated)
    } else {
        escape_xml(value)
    }
}

/// Escapes markup characters and drops characters XML 1.0 cannot carry.
pub(crate) fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Zero-based column index to spreadsheet letters: 0 → A, 25 → Z, 26 → AA.
pub(crate) fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn zip_to_io(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::other(other),
    }
}
