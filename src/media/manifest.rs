//! Media manifest decoding and media extraction.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use log::{debug, info, warn};

use crate::archive::ApkgArchive;
use crate::config::{MEDIA_DIR_NAME, MEDIA_MANIFEST_ENTRY};
use crate::error_handling::{ConversionError, ConversionStats, WarningType};

/// Mapping of archive entry names ("0", "1", ...) to original media filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaManifest {
    entries: BTreeMap<String, String>,
}

impl MediaManifest {
    /// Parses the JSON manifest written by legacy exports.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries: BTreeMap<String, String> = serde_json::from_slice(bytes)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(archive entry, original filename)` pairs in entry-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Original media filename to the path written into the table.
///
/// Built from the manifest before anything is written, so references can be
/// rewritten while flattening; [`extract_media`] then writes the planned files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMap {
    links: HashMap<String, String>,
    /// `(archive entry, file name under the media directory)`
    files: Vec<(String, String)>,
}

impl MediaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans extraction of every manifest entry present in `archive`.
    ///
    /// Filenames are reduced to their last path component so a manifest cannot
    /// write outside the media directory. Entries whose blob is absent from the
    /// archive are skipped and counted. When two entries reduce to the same
    /// name, the first in entry order keeps it and the later one is skipped
    /// and counted.
    pub fn plan(archive: &ApkgArchive, manifest: &MediaManifest, stats: &ConversionStats) -> Self {
        let mut map = Self::new();
        let mut taken: HashSet<String> = HashSet::new();
        for (entry, filename) in manifest.iter() {
            let Some(safe_name) = Path::new(filename).file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping media entry {} with unusable filename {:?}", entry, filename);
                continue;
            };
            if !archive.has_entry(entry) {
                debug!("Media entry {} ({}) is missing from the package", entry, filename);
                stats.increment_warning(WarningType::MissingMediaBlob);
                continue;
            }
            if !taken.insert(safe_name.to_string()) {
                warn!(
                    "Skipping media entry {} ({}): {}/{} is already taken",
                    entry, filename, MEDIA_DIR_NAME, safe_name
                );
                stats.increment_warning(WarningType::DuplicateMediaName);
                continue;
            }
            map.insert(filename, format!("{MEDIA_DIR_NAME}/{safe_name}"));
            map.files.push((entry.to_string(), safe_name.to_string()));
        }
        map
    }

    pub fn insert(&mut self, filename: impl Into<String>, link: impl Into<String>) {
        self.links.insert(filename.into(), link.into());
    }

    /// Link for a referenced filename, if that file is extracted.
    pub fn link(&self, filename: &str) -> Option<&str> {
        self.links.get(filename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Reads the package's media manifest.
///
/// Returns `Ok(None)` when the package has no manifest, or when the manifest
/// is not JSON (newer packages use a binary manifest, which is skipped with a
/// warning rather than failing the run).
pub fn read_manifest(archive: &mut ApkgArchive) -> Result<Option<MediaManifest>, ConversionError> {
    let Some(bytes) = archive.read_entry(MEDIA_MANIFEST_ENTRY)? else {
        debug!("Package has no media manifest");
        return Ok(None);
    };

    match MediaManifest::from_json(&bytes) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(e) => {
            warn!(
                "Media manifest in {} is not JSON ({}); media will not be extracted",
                archive.path().display(),
                e
            );
            Ok(None)
        }
    }
}

/// Writes the files planned in `media` into `<output_dir>/media/`.
///
/// # Returns
///
/// Returns the number of files written.
///
/// # Errors
///
/// Returns `ConversionError::IoWriteError` if the media directory or a media
/// file cannot be written.
pub fn extract_media(
    archive: &mut ApkgArchive,
    media: &MediaMap,
    output_dir: &Path,
) -> Result<usize, ConversionError> {
    let media_dir = output_dir.join(MEDIA_DIR_NAME);
    std::fs::create_dir_all(&media_dir).map_err(|e| ConversionError::io_write(&media_dir, e))?;

    let mut written = 0;
    for (entry, name) in &media.files {
        if archive.copy_entry_to(entry, &media_dir.join(name))? {
            written += 1;
        }
    }

    info!("Extracted {} media files to {}", written, media_dir.display());
    Ok(written)
}
