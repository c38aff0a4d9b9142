//! Row flattener.
//!
//! Joins notes with their models (and cards, for card-level output), applies
//! the note and card type filters, and produces a [`FlatTable`] whose cells
//! are plain text.

mod columns;
mod html;
mod rows;

pub use columns::ColumnSet;
pub use html::strip_html;
pub use rows::{flatten, list_note_types, FlatRecord, FlatTable, FlattenOptions, NoteTypeSummary};
