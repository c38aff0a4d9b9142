//! Schema reader.
//!
//! Decodes the collection database once, at this boundary, into explicit
//! record structs. Nothing downstream touches SQL rows.

mod models;
mod reader;

pub use models::{Card, Collection, Model, Note};
pub use reader::{
    compare_unicase, open_collection_pool, parse_legacy_models, read_collection, read_models,
    split_fields,
};
