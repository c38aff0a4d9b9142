//! Output column ordering.

use std::collections::HashSet;

use crate::collection::Model;
use crate::config::{RowGranularity, CARD_TYPE_COLUMN, NOTE_TYPE_COLUMN};

/// Builds the table header as models contribute rows.
///
/// The leading columns are fixed; after them come field names in the order
/// their models first contributed a row, each name appearing once. Models
/// that never contribute a row add nothing.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<String>,
    seen: HashSet<String>,
    contributors: HashSet<i64>,
}

impl ColumnSet {
    pub fn new(granularity: RowGranularity) -> Self {
        let mut columns = vec![NOTE_TYPE_COLUMN.to_string()];
        if granularity == RowGranularity::Card {
            columns.push(CARD_TYPE_COLUMN.to_string());
        }
        let seen = columns.iter().cloned().collect();
        Self {
            columns,
            seen,
            contributors: HashSet::new(),
        }
    }

    /// Records that `model` contributed a row; first call per model appends
    /// its unseen field names.
    pub fn add_model(&mut self, model: &Model) {
        if !self.contributors.insert(model.id) {
            return;
        }
        for field in &model.fields {
            if self.seen.insert(field.clone()) {
                self.columns.push(field.clone());
            }
        }
    }

    pub fn into_columns(self) -> Vec<String> {
        self.columns
    }
}
