//! Media extraction and reference resolution.
//!
//! Packages carry media as numbered blobs plus a manifest naming them. With
//! media export enabled the blobs are written next to the output table and
//! `[sound:...]` / `<img src=...>` references in field text are rewritten to
//! point at them.

mod manifest;
mod refs;

pub use manifest::{extract_media, read_manifest, MediaManifest, MediaMap};
pub use refs::resolve_media_refs;
