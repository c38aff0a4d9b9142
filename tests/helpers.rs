// Shared test helpers for building .apkg packages.
//
// Packages are built for real: a SQLite collection written with sqlx, zipped
// together with an optional media manifest and media blobs.

#![allow(dead_code)] // Each test file uses a different subset

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use apkg_export::collection::compare_unicase;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Field separator inside `notes.flds`.
pub const SEP: &str = "\x1f";

/// How the collection is stored inside the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `collection.anki2` with models as JSON in `col.models`
    Legacy,
    /// `collection.anki21b`, zstd-compressed, with `notetypes`/`fields`/`templates` tables
    Schema18,
}

#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NoteSpec {
    pub id: i64,
    pub model_id: i64,
    pub fields: Vec<String>,
}

/// Everything that goes into one test package.
#[derive(Debug, Clone)]
pub struct Package {
    pub layout: Layout,
    pub models: Vec<ModelSpec>,
    pub notes: Vec<NoteSpec>,
    /// `(card id, note id, ordinal)`
    pub cards: Vec<(i64, i64, i64)>,
    /// Raw manifest bytes; `None` omits the `media` entry
    pub media_manifest: Option<Vec<u8>>,
    /// `(archive entry, bytes)`
    pub media_blobs: Vec<(String, Vec<u8>)>,
}

impl Package {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            models: Vec::new(),
            notes: Vec::new(),
            cards: Vec::new(),
            media_manifest: None,
            media_blobs: Vec::new(),
        }
    }

    pub fn model(mut self, id: i64, name: &str, fields: &[&str], templates: &[&str]) -> Self {
        self.models.push(ModelSpec {
            id,
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            templates: templates.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    /// Adds a note plus one card per ordinal in `card_ords`.
    pub fn note(mut self, id: i64, model_id: i64, fields: &[&str], card_ords: &[i64]) -> Self {
        self.notes.push(NoteSpec {
            id,
            model_id,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        for ord in card_ords {
            self.cards.push((id * 100 + ord, id, *ord));
        }
        self
    }

    pub fn media(mut self, manifest: serde_json::Value, blobs: &[(&str, &[u8])]) -> Self {
        self.media_manifest = Some(manifest.to_string().into_bytes());
        self.media_blobs = blobs
            .iter()
            .map(|(entry, bytes)| (entry.to_string(), bytes.to_vec()))
            .collect();
        self
    }

    /// Writes the package to `dir/name` and returns its path.
    pub async fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let db_path = dir.join(format!("{name}.collection"));
        write_collection(&db_path, self).await;
        let db_bytes = std::fs::read(&db_path).expect("Failed to read collection");
        std::fs::remove_file(&db_path).expect("Failed to remove collection");

        let (entry_name, payload) = match self.layout {
            Layout::Legacy => ("collection.anki2", db_bytes),
            Layout::Schema18 => (
                "collection.anki21b",
                zstd::encode_all(&db_bytes[..], 0).expect("Failed to compress collection"),
            ),
        };

        let mut entries: Vec<(String, Vec<u8>)> = vec![(entry_name.to_string(), payload)];
        if let Some(manifest) = &self.media_manifest {
            entries.push(("media".to_string(), manifest.clone()));
        }
        entries.extend(self.media_blobs.iter().cloned());

        let path = dir.join(name);
        write_zip(&path, &entries);
        path
    }
}

/// The one-note deck: `Basic(Front, Back)` with `("Q1", "A1")`.
pub fn basic_package() -> Package {
    Package::new(Layout::Legacy)
        .model(1, "Basic", &["Front", "Back"], &["Card 1"])
        .note(10, 1, &["Q1", "A1"], &[0])
}

/// A mixed deck: two Basic notes, one reversed note with two cards, and a
/// vocabulary type with no notes.
pub fn mixed_package(layout: Layout) -> Package {
    Package::new(layout)
        .model(1, "Basic", &["Front", "Back"], &["Card 1"])
        .model(
            2,
            "Basic (and reversed card)",
            &["Front", "Back"],
            &["Card 1", "Card 2"],
        )
        .model(3, "Vocab", &["Word", "Meaning"], &["Recognition"])
        .note(10, 1, &["<b>chat</b>", "cat"], &[0])
        .note(11, 2, &["chien", "<div>dog</div>"], &[0, 1])
        .note(12, 1, &["oiseau", "bird"], &[0])
}

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn write_zip(path: &Path, entries: &[(String, Vec<u8>)]) {
    let file = File::create(path).expect("Failed to create package");
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(name.as_str(), SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        zip.write_all(bytes).expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish package");
}

async fn write_collection(db_path: &Path, package: &Package) {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .collation("unicase", compare_unicase);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create collection database");

    let models_json = match package.layout {
        Layout::Legacy => legacy_models_json(&package.models),
        Layout::Schema18 => String::new(),
    };

    for statement in [
        "CREATE TABLE col (id INTEGER PRIMARY KEY, models TEXT NOT NULL)",
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, mid INTEGER NOT NULL, flds TEXT NOT NULL)",
        "CREATE TABLE cards (id INTEGER PRIMARY KEY, nid INTEGER NOT NULL, ord INTEGER NOT NULL)",
    ] {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Failed to create table");
    }
    sqlx::query("INSERT INTO col (id, models) VALUES (1, ?)")
        .bind(models_json)
        .execute(&pool)
        .await
        .expect("Failed to insert col row");

    if package.layout == Layout::Schema18 {
        write_notetype_tables(&pool, &package.models).await;
    }

    for note in &package.notes {
        sqlx::query("INSERT INTO notes (id, mid, flds) VALUES (?, ?, ?)")
            .bind(note.id)
            .bind(note.model_id)
            .bind(note.fields.join(SEP))
            .execute(&pool)
            .await
            .expect("Failed to insert note");
    }
    for (id, nid, ord) in &package.cards {
        sqlx::query("INSERT INTO cards (id, nid, ord) VALUES (?, ?, ?)")
            .bind(id)
            .bind(nid)
            .bind(ord)
            .execute(&pool)
            .await
            .expect("Failed to insert card");
    }

    pool.close().await;
}

/// Creates the schema 18 note type tables the way Anki defines them, with
/// `unicase` name columns and unique name indexes.
async fn write_notetype_tables(pool: &sqlx::SqlitePool, models: &[ModelSpec]) {
    for statement in [
        "CREATE TABLE notetypes (
            id integer not null primary key,
            name text not null COLLATE unicase,
            mtime_secs integer not null,
            usn integer not null,
            config blob not null
        )",
        "CREATE UNIQUE INDEX idx_notetypes_name ON notetypes (name)",
        "CREATE INDEX idx_notetypes_usn ON notetypes (usn)",
        "CREATE TABLE fields (
            ntid integer not null,
            ord integer not null,
            name text not null COLLATE unicase,
            config blob not null,
            PRIMARY KEY (ntid, ord)
        ) without rowid",
        "CREATE UNIQUE INDEX idx_fields_name_ntid ON fields (name, ntid)",
        "CREATE TABLE templates (
            ntid integer not null,
            ord integer not null,
            name text not null COLLATE unicase,
            mtime_secs integer not null,
            usn integer not null,
            config blob not null,
            PRIMARY KEY (ntid, ord)
        ) without rowid",
        "CREATE UNIQUE INDEX idx_templates_name_ntid ON templates (name, ntid)",
        "CREATE INDEX idx_templates_usn ON templates (usn)",
    ] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .expect("Failed to create table");
    }
    for model in models {
        sqlx::query(
            "INSERT INTO notetypes (id, name, mtime_secs, usn, config) VALUES (?, ?, 0, 0, ?)",
        )
        .bind(model.id)
        .bind(&model.name)
        .bind(Vec::<u8>::new())
        .execute(pool)
        .await
        .expect("Failed to insert note type");
        for (ord, name) in model.fields.iter().enumerate() {
            sqlx::query("INSERT INTO fields (ntid, ord, name, config) VALUES (?, ?, ?, ?)")
                .bind(model.id)
                .bind(ord as i64)
                .bind(name)
                .bind(Vec::<u8>::new())
                .execute(pool)
                .await
                .expect("Failed to insert field");
        }
        for (ord, name) in model.templates.iter().enumerate() {
            sqlx::query(
                "INSERT INTO templates (ntid, ord, name, mtime_secs, usn, config) \
                 VALUES (?, ?, ?, 0, 0, ?)",
            )
            .bind(model.id)
            .bind(ord as i64)
            .bind(name)
            .bind(Vec::<u8>::new())
            .execute(pool)
            .await
            .expect("Failed to insert template");
        }
    }
}

fn legacy_models_json(models: &[ModelSpec]) -> String {
    let mut map = serde_json::Map::new();
    for model in models {
        let flds: Vec<_> = model
            .fields
            .iter()
            .enumerate()
            .map(|(ord, name)| json!({"name": name, "ord": ord}))
            .collect();
        let tmpls: Vec<_> = model
            .templates
            .iter()
            .enumerate()
            .map(|(ord, name)| json!({"name": name, "ord": ord}))
            .collect();
        map.insert(
            model.id.to_string(),
            json!({"id": model.id, "name": model.name, "flds": flds, "tmpls": tmpls}),
        );
    }
    serde_json::Value::Object(map).to_string()
}

/// Reads a part of an XLSX package as text.
pub fn read_xlsx_part(path: &Path, part: &str) -> String {
    use std::io::Read;

    let file = File::open(path).expect("Failed to open workbook");
    let mut archive = zip::ZipArchive::new(file).expect("Workbook is not a zip");
    let mut entry = archive.by_name(part).expect("Missing workbook part");
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .expect("Failed to read workbook part");
    text
}
