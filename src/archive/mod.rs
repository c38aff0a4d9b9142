//! Archive loading.
//!
//! An `.apkg` is a zip archive holding a SQLite snapshot of the collection,
//! a `media` manifest and numbered media blobs. This module opens the package
//! and extracts the database into a scoped temporary file.

mod loader;

pub use loader::{ApkgArchive, ExtractedCollection};
