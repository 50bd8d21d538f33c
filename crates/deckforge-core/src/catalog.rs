//! Note type catalog.
//!
//! Note types are read-only schema definitions loaded from
//! `config/note_types.json`. The card store and the deck packer use them for
//! field ordering, validation and default deck names.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// A note type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteType {
    /// Display name used for the exported model
    pub name: String,

    /// Stable model identifier in the package format
    pub model_id: i64,

    /// Deck used when packing without an override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_deck: Option<String>,

    /// Ordered field names; the first one is the question side
    pub fields: Vec<String>,
}

impl NoteType {
    /// Name of the question field.
    pub fn front_field(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    fn validate(&self, key: &str) -> Result<()> {
        if self.fields.is_empty() {
            return Err(ForgeError::Catalog(format!(
                "Note type \"{}\" declares no fields",
                key
            )));
        }
        for (idx, field) in self.fields.iter().enumerate() {
            if field.trim().is_empty() {
                return Err(ForgeError::Catalog(format!(
                    "Note type \"{}\" has an empty field name",
                    key
                )));
            }
            if self.fields[..idx].contains(field) {
                return Err(ForgeError::Catalog(format!(
                    "Note type \"{}\" declares field \"{}\" twice",
                    key, field
                )));
            }
        }
        Ok(())
    }
}

/// Mapping from note type key to definition.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    note_types: BTreeMap<String, NoteType>,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::NotFound` if the file is missing and
    /// `ForgeError::Catalog` if it cannot be parsed or a definition is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForgeError::NotFound(format!(
                "Note type catalog {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents).map_err(|err| match err {
            ForgeError::Catalog(msg) => ForgeError::Catalog(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let note_types: BTreeMap<String, NoteType> = serde_json::from_str(contents)
            .map_err(|e| ForgeError::Catalog(format!("Invalid note type JSON: {}", e)))?;
        Self::from_map(note_types)
    }

    /// Build a catalog from already-parsed definitions.
    pub fn from_map(note_types: BTreeMap<String, NoteType>) -> Result<Self> {
        for (key, note_type) in &note_types {
            note_type.validate(key)?;
        }
        Ok(Self { note_types })
    }

    pub fn get(&self, key: &str) -> Option<&NoteType> {
        self.note_types.get(key)
    }

    /// Look up a note type, failing with `NotFound` when it is absent.
    pub fn require(&self, key: &str) -> Result<&NoteType> {
        self.get(key)
            .ok_or_else(|| ForgeError::NotFound(format!("Note type \"{}\"", key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NoteType)> {
        self.note_types.iter().map(|(key, nt)| (key.as_str(), nt))
    }

    pub fn len(&self) -> usize {
        self.note_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.note_types.is_empty()
    }
}
