//! Schema reader: decodes note types, notes and cards from a collection database.
//!
//! Two model layouts are supported:
//! - legacy collections store every note type as JSON in `col.models`
//! - schema 18 collections (`collection.anki21b`) use the `notetypes`,
//!   `fields` and `templates` tables

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use futures::TryStreamExt;
use log::{debug, info};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::models::{Card, Collection, Model, Note};
use crate::config::FIELD_SEPARATOR;
use crate::error_handling::{ConversionError, ConversionStats, WarningType};

#[derive(Debug, Deserialize)]
struct LegacyModel {
    name: String,
    #[serde(default)]
    flds: Vec<LegacyNamed>,
    #[serde(default)]
    tmpls: Vec<LegacyNamed>,
}

#[derive(Debug, Deserialize)]
struct LegacyNamed {
    name: String,
    #[serde(default)]
    ord: i64,
}

/// Reads the whole collection at `db_path`.
///
/// The connection is opened for the duration of the read and closed before
/// returning, on success and on error.
///
/// # Errors
///
/// Returns `ConversionError::MalformedCollection` if the file is not a SQLite
/// database, required tables are missing, the model definitions cannot be
/// decoded, or a note references an unknown note type.
pub async fn read_collection(
    db_path: &Path,
    stats: &ConversionStats,
) -> Result<Collection, ConversionError> {
    let pool = open_collection_pool(db_path).await?;
    let result = read_from_pool(&pool, stats).await;
    pool.close().await;
    result
}

/// Case-insensitive comparison backing Anki's `unicase` collation.
///
/// Schema 18 declares the note type, field and template name columns with
/// `COLLATE unicase` and indexes them, so SQLite refuses to prepare queries
/// on those tables unless a collation with that name is registered.
pub fn compare_unicase(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Opens a single-connection pool on an existing collection file.
pub async fn open_collection_pool(db_path: &Path) -> Result<SqlitePool, ConversionError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(false)
        .collation("unicase", compare_unicase);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| {
            ConversionError::MalformedCollection(format!("cannot open collection database: {e}"))
        })
}

async fn read_from_pool(
    pool: &SqlitePool,
    stats: &ConversionStats,
) -> Result<Collection, ConversionError> {
    let models = read_models(pool).await?;
    let notes = read_notes(pool, &models, stats).await?;
    let cards = read_cards(pool, &notes).await?;

    info!(
        "Read {} note type{}, {} notes, {} cards",
        models.len(),
        if models.len() == 1 { "" } else { "s" },
        notes.len(),
        cards.len()
    );

    Ok(Collection {
        models,
        notes,
        cards,
    })
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool, ConversionError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                ConversionError::MalformedCollection(format!("not a collection database: {e}"))
            })?;
    Ok(count > 0)
}

async fn require_table(pool: &SqlitePool, table: &str) -> Result<(), ConversionError> {
    if table_exists(pool, table).await? {
        Ok(())
    } else {
        Err(ConversionError::MalformedCollection(format!(
            "missing table '{table}'"
        )))
    }
}

/// Reads note types, preferring the schema 18 tables when they are populated.
pub async fn read_models(pool: &SqlitePool) -> Result<BTreeMap<i64, Model>, ConversionError> {
    if table_exists(pool, "notetypes").await? {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notetypes")
            .fetch_one(pool)
            .await?;
        if count > 0 {
            debug!("Reading note types from notetypes table");
            return read_table_models(pool).await;
        }
    }

    require_table(pool, "col").await?;
    let raw: Option<String> = sqlx::query_scalar("SELECT models FROM col LIMIT 1")
        .fetch_optional(pool)
        .await
        .map_err(|e| ConversionError::MalformedCollection(format!("cannot read col.models: {e}")))?;
    let raw = raw.ok_or_else(|| {
        ConversionError::MalformedCollection("col table has no rows".to_string())
    })?;
    debug!("Reading note types from col.models");
    parse_legacy_models(&raw)
}

async fn read_table_models(pool: &SqlitePool) -> Result<BTreeMap<i64, Model>, ConversionError> {
    require_table(pool, "fields").await?;
    require_table(pool, "templates").await?;

    let mut models = BTreeMap::new();
    for row in sqlx::query("SELECT id, name FROM notetypes ORDER BY id")
        .fetch_all(pool)
        .await?
    {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        models.insert(
            id,
            Model {
                id,
                name,
                fields: Vec::new(),
                templates: Vec::new(),
            },
        );
    }

    for row in sqlx::query("SELECT ntid, name FROM fields ORDER BY ntid, ord")
        .fetch_all(pool)
        .await?
    {
        let ntid: i64 = row.try_get("ntid")?;
        if let Some(model) = models.get_mut(&ntid) {
            model.fields.push(row.try_get("name")?);
        }
    }

    for row in sqlx::query("SELECT ntid, name FROM templates ORDER BY ntid, ord")
        .fetch_all(pool)
        .await?
    {
        let ntid: i64 = row.try_get("ntid")?;
        if let Some(model) = models.get_mut(&ntid) {
            model.templates.push(row.try_get("name")?);
        }
    }

    Ok(models)
}

/// Decodes the legacy `col.models` JSON object (model id to definition).
pub fn parse_legacy_models(raw: &str) -> Result<BTreeMap<i64, Model>, ConversionError> {
    let parsed: HashMap<String, LegacyModel> = serde_json::from_str(raw).map_err(|e| {
        ConversionError::MalformedCollection(format!("cannot parse note type definitions: {e}"))
    })?;

    let mut models = BTreeMap::new();
    for (key, legacy) in parsed {
        let id: i64 = key.parse().map_err(|_| {
            ConversionError::MalformedCollection(format!("note type id '{key}' is not numeric"))
        })?;

        let mut flds = legacy.flds;
        flds.sort_by_key(|f| f.ord);
        let mut tmpls = legacy.tmpls;
        tmpls.sort_by_key(|t| t.ord);

        models.insert(
            id,
            Model {
                id,
                name: legacy.name,
                fields: flds.into_iter().map(|f| f.name).collect(),
                templates: tmpls.into_iter().map(|t| t.name).collect(),
            },
        );
    }
    Ok(models)
}

/// Splits a raw `flds` value and aligns it to `field_count`.
///
/// Missing trailing values are padded with empty strings and surplus values
/// are dropped; either adjustment is counted in `stats`.
pub fn split_fields(raw: &str, field_count: usize, stats: &ConversionStats) -> Vec<String> {
    let mut values: Vec<String> = raw.split(FIELD_SEPARATOR).map(str::to_string).collect();
    if values.len() < field_count {
        stats.increment_warning(WarningType::PaddedFields);
        values.resize(field_count, String::new());
    } else if values.len() > field_count {
        stats.increment_warning(WarningType::TruncatedFields);
        values.truncate(field_count);
    }
    values
}

async fn read_notes(
    pool: &SqlitePool,
    models: &BTreeMap<i64, Model>,
    stats: &ConversionStats,
) -> Result<Vec<Note>, ConversionError> {
    require_table(pool, "notes").await?;

    let mut notes = Vec::new();
    let mut rows = sqlx::query("SELECT id, mid, flds FROM notes ORDER BY id").fetch(pool);
    while let Some(row) = rows.try_next().await? {
        let id: i64 = row.try_get("id")?;
        let model_id: i64 = row.try_get("mid")?;
        let raw: String = row.try_get("flds")?;

        let model = models.get(&model_id).ok_or_else(|| {
            ConversionError::MalformedCollection(format!(
                "note {id} references unknown note type {model_id}"
            ))
        })?;
        let value_count = raw.split(FIELD_SEPARATOR).count();
        if value_count != model.fields.len() {
            debug!(
                "Note {} has {} values, note type '{}' declares {} fields",
                id,
                value_count,
                model.name,
                model.fields.len()
            );
        }
        let fields = split_fields(&raw, model.fields.len(), stats);

        notes.push(Note {
            id,
            model_id,
            fields,
        });
    }
    Ok(notes)
}

async fn read_cards(pool: &SqlitePool, notes: &[Note]) -> Result<Vec<Card>, ConversionError> {
    require_table(pool, "cards").await?;

    let note_ids: HashSet<i64> = notes.iter().map(|n| n.id).collect();
    let mut cards = Vec::new();
    let mut orphans = 0usize;
    let mut rows = sqlx::query("SELECT id, nid, ord FROM cards ORDER BY nid, ord, id").fetch(pool);
    while let Some(row) = rows.try_next().await? {
        let card = Card {
            id: row.try_get("id")?,
            note_id: row.try_get("nid")?,
            ord: row.try_get("ord")?,
        };
        if note_ids.contains(&card.note_id) {
            cards.push(card);
        } else {
            orphans += 1;
        }
    }
    if orphans > 0 {
        debug!("Skipped {} cards whose note is missing", orphans);
    }
    Ok(cards)
}
