//! Anki `.apkg` package writer.
//!
//! An `.apkg` file is a zip archive holding:
//! - `collection.anki2`: an SQLite collection with the models, decks, notes
//!   and one new card per note
//! - `media`: a JSON object mapping archive entry names (`"0"`, `"1"`, ...) to
//!   original file names
//! - one entry per media file, named by its index
//!
//! The collection is built in an in-memory SQLite database and serialized
//! straight into the archive.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, DatabaseName};
use serde_json::{json, Map, Value};
use sha1::{Digest, Sha1};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::deck::{DEFAULT_DECK_ID, FALLBACK_DECK};
use super::model::ModelDescriptor;
use super::package::{Package, PackageWriter};
use crate::error::{ForgeError, Result};
use crate::fs::write_atomic;

const COLLECTION_ENTRY: &str = "collection.anki2";
const MEDIA_ENTRY: &str = "media";
const FIELD_SEPARATOR: &str = "\x1f";
const COLLECTION_VERSION: i64 = 11;

const SCHEMA: &str = r#"
CREATE TABLE col (
    id integer primary key,
    crt integer not null,
    mod integer not null,
    scm integer not null,
    ver integer not null,
    dty integer not null,
    usn integer not null,
    ls integer not null,
    conf text not null,
    models text not null,
    decks text not null,
    dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key,
    guid text not null,
    mid integer not null,
    mod integer not null,
    usn integer not null,
    tags text not null,
    flds text not null,
    sfld integer not null,
    csum integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE cards (
    id integer primary key,
    nid integer not null,
    did integer not null,
    ord integer not null,
    mod integer not null,
    usn integer not null,
    type integer not null,
    queue integer not null,
    due integer not null,
    ivl integer not null,
    factor integer not null,
    reps integer not null,
    lapses integer not null,
    left integer not null,
    odue integer not null,
    odid integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE revlog (
    id integer primary key,
    cid integer not null,
    usn integer not null,
    time integer not null,
    ivl integer not null,
    factor integer not null,
    reps integer not null,
    lapses integer not null,
    left integer not null,
    type integer not null
);
CREATE TABLE graves (
    usn integer not null,
    oid integer not null,
    type integer not null
);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
"#;

const MODEL_CSS: &str = ".card {\n font-family: arial;\n font-size: 20px;\n text-align: center;\n color: black;\n background-color: white;\n}\n";
const LATEX_PRE: &str = "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n";
const LATEX_POST: &str = "\\end{document}";

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern is valid"));

/// Writes packages in the Anki 2.1 legacy `.apkg` layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApkgWriter;

impl ApkgWriter {
    pub fn new() -> Self {
        Self
    }

    fn collection_bytes(package: &Package) -> Result<Vec<u8>> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        let now = Utc::now();
        let now_secs = now.timestamp();
        let now_millis = now.timestamp_millis();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
             VALUES (1, ?1, ?2, ?2, ?3, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
            params![
                now_secs,
                now_millis,
                COLLECTION_VERSION,
                collection_conf(package).to_string(),
                models_json(package, now_secs).to_string(),
                decks_json(package, now_secs).to_string(),
                deck_conf_json().to_string(),
            ],
        )?;

        let mut next_id = now_millis;
        for deck in &package.decks {
            for (position, note) in deck.notes.iter().enumerate() {
                let note_id = next_id;
                next_id += 1;
                let sort_field = strip_html(note.fields.first().map(String::as_str).unwrap_or(""));
                tx.execute(
                    "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
                     VALUES (?1, ?2, ?3, ?4, -1, ?5, ?6, ?7, ?8, 0, '')",
                    params![
                        note_id,
                        note.guid,
                        note.model_id,
                        now_secs,
                        format_tags(&note.tags),
                        note.fields.join(FIELD_SEPARATOR),
                        sort_field,
                        field_checksum(&sort_field),
                    ],
                )?;
                tx.execute(
                    "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due, ivl, factor, reps, lapses, left, odue, odid, flags, data)
                     VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
                    params![note_id, note_id, deck.id, now_secs, position as i64],
                )?;
            }
        }
        tx.commit()?;

        let data = conn.serialize(DatabaseName::Main)?;
        Ok(data.to_vec())
    }

    fn archive_bytes(package: &Package, collection: &[u8]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(COLLECTION_ENTRY, options)?;
        zip.write_all(collection)?;

        let mut media_index = BTreeMap::new();
        for (idx, path) in package.media.iter().enumerate() {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| {
                    ForgeError::Package(format!("Media path has no file name: {}", path.display()))
                })?;
            let contents = std::fs::read(path)?;
            zip.start_file(idx.to_string(), options)?;
            zip.write_all(&contents)?;
            media_index.insert(idx.to_string(), file_name);
        }

        zip.start_file(MEDIA_ENTRY, options)?;
        zip.write_all(serde_json::to_string(&media_index)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl PackageWriter for ApkgWriter {
    fn write(&self, package: &Package, output: &Path) -> Result<()> {
        let collection = Self::collection_bytes(package)?;
        let archive = Self::archive_bytes(package, &collection)?;
        write_atomic(output, &archive)?;
        debug!(
            output = %output.display(),
            decks = package.decks.len(),
            notes = package.note_count(),
            media = package.media.len(),
            bytes = archive.len(),
            "Wrote apkg package"
        );
        Ok(())
    }
}

/// Anki tags column: space separated and space padded.
fn format_tags(tags: &[String]) -> String {
    let cleaned: Vec<String> = tags
        .iter()
        .map(|tag| tag.split_whitespace().collect::<Vec<_>>().join("_"))
        .filter(|tag| !tag.is_empty())
        .collect();
    if cleaned.is_empty() {
        String::new()
    } else {
        format!(" {} ", cleaned.join(" "))
    }
}

fn strip_html(value: &str) -> String {
    HTML_TAG.replace_all(value, "").trim().to_string()
}

/// First 32 bits of the SHA-1 of the sort field, as Anki computes `csum`.
fn field_checksum(sort_field: &str) -> i64 {
    let digest = Sha1::digest(sort_field.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn collection_conf(package: &Package) -> Value {
    let current_deck = package
        .decks
        .first()
        .map(|deck| deck.id)
        .unwrap_or(DEFAULT_DECK_ID);
    json!({
        "activeDecks": [current_deck],
        "curDeck": current_deck,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": package.models.first().map(|model| model.id.to_string()),
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true
    })
}

fn models_json(package: &Package, now_secs: i64) -> Value {
    let mut first_deck: HashMap<i64, i64> = HashMap::new();
    for deck in &package.decks {
        for note in &deck.notes {
            first_deck.entry(note.model_id).or_insert(deck.id);
        }
    }

    let mut models = Map::new();
    for model in &package.models {
        let deck_id = first_deck
            .get(&model.id)
            .copied()
            .unwrap_or(DEFAULT_DECK_ID);
        models.insert(model.id.to_string(), model_json(model, deck_id, now_secs));
    }
    Value::Object(models)
}

fn model_json(model: &ModelDescriptor, deck_id: i64, now_secs: i64) -> Value {
    let fields: Vec<Value> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "name": name,
                "ord": ord,
                "sticky": false,
                "rtl": false,
                "font": "Arial",
                "size": 20,
                "media": []
            })
        })
        .collect();
    let templates: Vec<Value> = model
        .templates
        .iter()
        .enumerate()
        .map(|(ord, template)| {
            json!({
                "name": template.name,
                "ord": ord,
                "qfmt": template.qfmt,
                "afmt": template.afmt,
                "bqfmt": "",
                "bafmt": "",
                "did": null
            })
        })
        .collect();

    json!({
        "id": model.id,
        "name": model.name,
        "type": 0,
        "mod": now_secs,
        "usn": -1,
        "sortf": 0,
        "did": deck_id,
        "tmpls": templates,
        "flds": fields,
        "css": MODEL_CSS,
        "latexPre": LATEX_PRE,
        "latexPost": LATEX_POST,
        "tags": [],
        "vers": [],
        "req": [[0, "all", [0]]]
    })
}

fn deck_json(id: i64, name: &str, now_secs: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "desc": "",
        "collapsed": false,
        "conf": 1,
        "dyn": 0,
        "extendNew": 10,
        "extendRev": 50,
        "mod": now_secs,
        "usn": -1,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0]
    })
}

fn decks_json(package: &Package, now_secs: i64) -> Value {
    let mut decks = Map::new();
    decks.insert(
        DEFAULT_DECK_ID.to_string(),
        deck_json(DEFAULT_DECK_ID, FALLBACK_DECK, now_secs),
    );
    for deck in &package.decks {
        decks.insert(deck.id.to_string(), deck_json(deck.id, &deck.name, now_secs));
    }
    Value::Object(decks)
}

fn deck_conf_json() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100
            }
        }
    })
}
