//! Typed records decoded from the collection database.

use std::collections::BTreeMap;

/// A note type: its ordered field names and card templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: i64,
    pub name: String,
    /// Field names in storage order; note values map to them by position.
    pub fields: Vec<String>,
    /// Template ("Card Type") names in ordinal order.
    pub templates: Vec<String>,
}

impl Model {
    /// Name of the template a card with ordinal `ord` was generated from.
    ///
    /// Cloze note types have a single template but produce one card per cloze
    /// number, so ordinals past the template list are named `Card {ord + 1}`.
    pub fn template_name(&self, ord: i64) -> String {
        usize::try_from(ord)
            .ok()
            .and_then(|i| self.templates.get(i))
            .cloned()
            .unwrap_or_else(|| format!("Card {}", ord + 1))
    }
}

/// A note with its field values already split and aligned to its model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub model_id: i64,
    pub fields: Vec<String>,
}

/// A card: one rendering of a note through one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub id: i64,
    pub note_id: i64,
    pub ord: i64,
}

/// Everything the flattener needs from one collection.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Note types keyed by id.
    pub models: BTreeMap<i64, Model>,
    /// Notes ordered by id.
    pub notes: Vec<Note>,
    /// Cards ordered by note id, then ordinal.
    pub cards: Vec<Card>,
}

impl Collection {
    pub fn model(&self, id: i64) -> Option<&Model> {
        self.models.get(&id)
    }
}
