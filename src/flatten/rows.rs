//! Turning notes and cards into table records.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;

use super::columns::ColumnSet;
use super::html::strip_html;
use crate::collection::{Card, Collection, Model, Note};
use crate::config::{RowGranularity, CARD_TYPE_COLUMN, NOTE_TYPE_COLUMN};
use crate::error_handling::{ConversionError, ConversionStats};
use crate::media::{resolve_media_refs, MediaMap};

/// What to emit and which rows to keep.
#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions<'a> {
    pub granularity: RowGranularity,
    /// Keep only notes whose note type has exactly this name.
    pub note_type: Option<&'a str>,
    /// Keep only cards whose template has exactly this name. Implies
    /// card-level rows.
    pub card_type: Option<&'a str>,
    /// Rewrite media references to extracted files before stripping HTML.
    pub media: Option<&'a MediaMap>,
}

impl<'a> FlattenOptions<'a> {
    pub fn new(granularity: RowGranularity) -> Self {
        Self {
            granularity,
            note_type: None,
            card_type: None,
            media: None,
        }
    }

    fn effective_granularity(&self) -> RowGranularity {
        if self.card_type.is_some() {
            RowGranularity::Card
        } else {
            self.granularity
        }
    }
}

/// One output row before it is laid out against the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub note_type: String,
    /// Template name; `None` for note-level rows.
    pub card_type: Option<String>,
    /// Cleaned field values keyed by field name.
    pub fields: HashMap<String, String>,
}

impl FlatRecord {
    /// Cell value for `column`; empty when this record's model lacks it.
    pub fn value(&self, column: &str) -> &str {
        match column {
            NOTE_TYPE_COLUMN => &self.note_type,
            CARD_TYPE_COLUMN => self.card_type.as_deref().unwrap_or(""),
            _ => self.fields.get(column).map(String::as_str).unwrap_or(""),
        }
    }
}

/// The flattened table: header plus records, ready for a writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTable {
    pub granularity: RowGranularity,
    pub columns: Vec<String>,
    pub records: Vec<FlatRecord>,
}

impl FlatTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cells of record `index`, aligned to [`FlatTable::columns`].
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        let record = self.records.get(index)?;
        Some(self.columns.iter().map(|c| record.value(c)).collect())
    }

    /// All rows in order, aligned to [`FlatTable::columns`].
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.records
            .iter()
            .map(move |record| self.columns.iter().map(|c| record.value(c)).collect())
    }
}

/// Flattens a collection into one row per note, or one per card.
///
/// Notes are visited in id order and cards in ordinal order within a note.
/// Filters compare names exactly. An empty result is not an error here; the
/// caller decides what an empty table means.
///
/// # Errors
///
/// Returns `ConversionError::MalformedCollection` if a note refers to a model
/// the collection does not define.
pub fn flatten(
    collection: &Collection,
    options: &FlattenOptions<'_>,
    stats: &ConversionStats,
) -> Result<FlatTable, ConversionError> {
    let granularity = options.effective_granularity();
    let mut columns = ColumnSet::new(granularity);
    let mut records = Vec::new();

    let mut cards_by_note: HashMap<i64, Vec<&Card>> = HashMap::new();
    if granularity == RowGranularity::Card {
        for card in &collection.cards {
            cards_by_note.entry(card.note_id).or_default().push(card);
        }
    }

    for note in &collection.notes {
        let model = collection.model(note.model_id).ok_or_else(|| {
            ConversionError::MalformedCollection(format!(
                "note {} refers to unknown note type {}",
                note.id, note.model_id
            ))
        })?;
        if options.note_type.is_some_and(|wanted| wanted != model.name) {
            continue;
        }

        match granularity {
            RowGranularity::Note => {
                columns.add_model(model);
                records.push(FlatRecord {
                    note_type: model.name.clone(),
                    card_type: None,
                    fields: clean_fields(note, model, options.media, stats),
                });
            }
            RowGranularity::Card => {
                let Some(cards) = cards_by_note.get(&note.id) else {
                    debug!("Note {} has no cards", note.id);
                    continue;
                };
                let selected: Vec<String> = cards
                    .iter()
                    .map(|card| model.template_name(card.ord))
                    .filter(|name| options.card_type.is_none_or(|wanted| wanted == name))
                    .collect();
                if selected.is_empty() {
                    continue;
                }

                columns.add_model(model);
                let fields = clean_fields(note, model, options.media, stats);
                for card_type in selected {
                    records.push(FlatRecord {
                        note_type: model.name.clone(),
                        card_type: Some(card_type),
                        fields: fields.clone(),
                    });
                }
            }
        }
    }

    Ok(FlatTable {
        granularity,
        columns: columns.into_columns(),
        records,
    })
}

fn clean_fields(
    note: &Note,
    model: &Model,
    media: Option<&MediaMap>,
    stats: &ConversionStats,
) -> HashMap<String, String> {
    let mut fields = HashMap::with_capacity(model.fields.len());
    for (name, raw) in model.fields.iter().zip(&note.fields) {
        let cleaned = match media {
            Some(map) => strip_html(&resolve_media_refs(raw, map, stats)),
            None => strip_html(raw),
        };
        // A repeated field name keeps its first value.
        fields.entry(name.clone()).or_insert(cleaned);
    }
    fields
}

/// A note type as shown by the listing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTypeSummary {
    pub name: String,
    /// Notes using any model with this name.
    pub note_count: usize,
    /// Template names of the first model with this name.
    pub templates: Vec<String>,
}

impl fmt::Display for NoteTypeSummary {
    /// Formats as `Basic (2 notes; Card 1)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} note{}",
            self.name,
            self.note_count,
            if self.note_count == 1 { "" } else { "s" }
        )?;
        if !self.templates.is_empty() {
            write!(f, "; {}", self.templates.join(", "))?;
        }
        write!(f, ")")
    }
}

/// Distinct note type names, in model-id order of first appearance.
pub fn list_note_types(collection: &Collection) -> Vec<NoteTypeSummary> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for note in &collection.notes {
        if let Some(model) = collection.model(note.model_id) {
            *counts.entry(model.name.as_str()).or_default() += 1;
        }
    }

    let mut seen = HashSet::new();
    collection
        .models
        .values()
        .filter(|model| seen.insert(model.name.as_str()))
        .map(|model| NoteTypeSummary {
            name: model.name.clone(),
            note_count: counts.get(model.name.as_str()).copied().unwrap_or(0),
            templates: model.templates.clone(),
        })
        .collect()
}
