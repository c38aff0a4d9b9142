//! Configuration constants.
//!
//! Archive entry names, column labels and format limits used throughout the
//! pipeline.

/// Collection database entry names, most preferred first.
///
/// Newer exports ship a zstd-compressed `collection.anki21b` next to a stub
/// `collection.anki2` that only tells old clients to upgrade, so the legacy
/// name must be the last resort.
pub const COLLECTION_ENTRY_NAMES: [&str; 3] =
    ["collection.anki21b", "collection.anki21", "collection.anki2"];

/// Archive entry holding the media id to filename manifest.
pub const MEDIA_MANIFEST_ENTRY: &str = "media";

/// Magic bytes at the start of a zstd frame.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Separator between field values in the `notes.flds` column (ASCII unit separator).
pub const FIELD_SEPARATOR: char = '\x1f';

/// Leading column holding the note type (model) name.
pub const NOTE_TYPE_COLUMN: &str = "Note Type";
/// Second column in card-level exports, holding the template name.
pub const CARD_TYPE_COLUMN: &str = "Card Type";

/// Directory (next to the output file) that extracted media lands in.
pub const MEDIA_DIR_NAME: &str = "media";

/// Maximum number of characters Excel accepts in a single cell.
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

/// Worksheet name for note-level XLSX exports.
pub const XLSX_NOTES_SHEET: &str = "Notes";
/// Worksheet name for card-level XLSX exports.
pub const XLSX_CARDS_SHEET: &str = "Cards";
