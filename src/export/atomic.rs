//! Replace-on-success file writes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error_handling::ConversionError;

/// Runs `write` against a temporary file next to `dest`, then renames it over
/// `dest`.
///
/// On any failure the temporary file is removed and `dest` is left as it was.
/// The destination directory must already exist.
pub fn write_atomically<T, F>(dest: &Path, write: F) -> Result<T, ConversionError>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<T>,
{
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".apkg-export-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ConversionError::io_write(dest, e))?;
    debug!("Writing {} via {}", dest.display(), tmp.path().display());

    let value = {
        let mut out = BufWriter::new(tmp.as_file_mut());
        let value = write(&mut out).map_err(|e| ConversionError::io_write(dest, e))?;
        out.flush().map_err(|e| ConversionError::io_write(dest, e))?;
        value
    };
    tmp.as_file()
        .sync_all()
        .map_err(|e| ConversionError::io_write(dest, e))?;

    tmp.persist(dest)
        .map_err(|e| ConversionError::io_write(dest, e.error))?;
    Ok(value)
}
