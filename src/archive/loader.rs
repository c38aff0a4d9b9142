//! Opening `.apkg` packages and pulling entries out of them.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;
use zip::ZipArchive;

use crate::config::{COLLECTION_ENTRY_NAMES, ZSTD_MAGIC};
use crate::error_handling::ConversionError;

/// An opened `.apkg` package.
pub struct ApkgArchive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

/// The collection database copied out of the package.
///
/// Backed by a temporary file that is deleted when this value is dropped, so
/// every exit path (success or error) releases it.
pub struct ExtractedCollection {
    entry_name: &'static str,
    file: NamedTempFile,
}

impl ExtractedCollection {
    /// Path of the extracted SQLite database.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Archive entry the database came from.
    pub fn entry_name(&self) -> &'static str {
        self.entry_name
    }
}

impl ApkgArchive {
    /// Opens a package for reading.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::InvalidArchive` if the file does not exist or
    /// is not a zip archive.
    pub fn open(path: &Path) -> Result<Self, ConversionError> {
        if !path.is_file() {
            return Err(ConversionError::invalid_archive(path, "file not found"));
        }
        let file = File::open(path)
            .map_err(|e| ConversionError::invalid_archive(path, format!("cannot open: {e}")))?;
        let zip = ZipArchive::new(file).map_err(|e| {
            ConversionError::invalid_archive(path, format!("not a zip archive: {e}"))
        })?;
        debug!("Opened {} ({} entries)", path.display(), zip.len());

        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when the package has an entry with exactly this name.
    pub fn has_entry(&self, name: &str) -> bool {
        self.zip.file_names().any(|entry| entry == name)
    }

    /// Name of the collection entry that will be used, newest format first.
    pub fn collection_entry(&self) -> Option<&'static str> {
        COLLECTION_ENTRY_NAMES
            .iter()
            .copied()
            .find(|name| self.has_entry(name))
    }

    /// Copies the collection database into a temporary file.
    ///
    /// zstd-compressed databases (`collection.anki21b`) are decompressed on
    /// the way out; detection is by frame magic rather than by name.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::InvalidArchive` when no recognized collection
    /// entry exists or its payload cannot be read or decompressed.
    pub fn extract_collection(&mut self) -> Result<ExtractedCollection, ConversionError> {
        let entry_name = self.collection_entry().ok_or_else(|| {
            ConversionError::invalid_archive(
                &self.path,
                format!(
                    "collection database not found (expected one of {})",
                    COLLECTION_ENTRY_NAMES.join(", ")
                ),
            )
        })?;

        let mut file = tempfile::Builder::new()
            .prefix("apkg-collection-")
            .suffix(".sqlite")
            .tempfile()
            .map_err(|e| ConversionError::io_write(&std::env::temp_dir(), e))?;

        let archive_path = self.path.clone();
        let invalid = |e: io::Error| {
            ConversionError::invalid_archive(&archive_path, format!("cannot read {entry_name}: {e}"))
        };

        let entry = self.zip.by_name(entry_name).map_err(|e| {
            ConversionError::invalid_archive(&archive_path, format!("cannot read {entry_name}: {e}"))
        })?;
        let mut reader = BufReader::with_capacity(64 * 1024, entry);
        let compressed = reader.fill_buf().map_err(invalid)?.starts_with(&ZSTD_MAGIC);

        if compressed {
            zstd::stream::copy_decode(&mut reader, &mut file).map_err(|e| {
                ConversionError::invalid_archive(
                    &archive_path,
                    format!("cannot decompress {entry_name}: {e}"),
                )
            })?;
        } else {
            io::copy(&mut reader, &mut file).map_err(invalid)?;
        }
        file.flush()
            .map_err(|e| ConversionError::io_write(file.path(), e))?;

        info!(
            "Extracted {}{} from {}",
            entry_name,
            if compressed { " (zstd)" } else { "" },
            self.path.display()
        );

        Ok(ExtractedCollection { entry_name, file })
    }

    /// Reads a whole entry into memory, or `None` if the entry does not exist.
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, ConversionError> {
        if !self.has_entry(name) {
            return Ok(None);
        }
        let mut entry = self.zip.by_name(name).map_err(|e| {
            ConversionError::invalid_archive(&self.path, format!("cannot read {name}: {e}"))
        })?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| {
            ConversionError::invalid_archive(&self.path, format!("cannot read {name}: {e}"))
        })?;
        Ok(Some(bytes))
    }

    /// Streams an entry into `dest`, returning false if the entry does not exist.
    pub fn copy_entry_to(&mut self, name: &str, dest: &Path) -> Result<bool, ConversionError> {
        if !self.has_entry(name) {
            return Ok(false);
        }
        let mut entry = self.zip.by_name(name).map_err(|e| {
            ConversionError::invalid_archive(&self.path, format!("cannot read {name}: {e}"))
        })?;
        let mut out = File::create(dest).map_err(|e| ConversionError::io_write(dest, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ConversionError::io_write(dest, e))?;
        Ok(true)
    }
}
