//! Pack recipes.
//!
//! A recipe is a named preset loaded from `config/recipes.json`:
//!
//! ```json
//! { "french": { "deck_name": "French", "output": "out/french.apkg", "query": "note_type:vocab tag:animals" } }
//! ```
//!
//! The query is a whitespace-separated list of `key:value` terms, all of which
//! must hold. Supported keys are `note_type`, `tag` and `search`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::storage::CardFilter;

/// A named pack preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Deck every selected card is packed into
    pub deck_name: String,

    /// Package file to write
    pub output: PathBuf,

    /// Card selection query
    #[serde(default)]
    pub query: String,
}

impl Recipe {
    /// Translate the query into a card filter.
    pub fn filter(&self) -> Result<CardFilter> {
        parse_query(&self.query)
    }
}

/// Parse a recipe query into a `CardFilter`.
///
/// # Errors
///
/// Returns `ForgeError::InvalidInput` for terms without `:`, unknown keys,
/// empty values, or a key given twice.
pub fn parse_query(query: &str) -> Result<CardFilter> {
    let mut filter = CardFilter::new();
    for term in query.split_whitespace() {
        let (key, value) = term.split_once(':').ok_or_else(|| {
            ForgeError::InvalidInput(format!(
                "Query term \"{}\" is not in key:value form",
                term
            ))
        })?;
        if value.is_empty() {
            return Err(ForgeError::InvalidInput(format!(
                "Query term \"{}\" has no value",
                term
            )));
        }
        let slot = match key {
            "note_type" => &mut filter.note_type,
            "tag" => &mut filter.tag,
            "search" => &mut filter.search,
            other => {
                return Err(ForgeError::InvalidInput(format!(
                    "Unknown query key \"{}\" (use note_type, tag or search)",
                    other
                )))
            }
        };
        if slot.is_some() {
            return Err(ForgeError::InvalidInput(format!(
                "Query key \"{}\" given more than once",
                key
            )));
        }
        *slot = Some(value.to_string());
    }
    Ok(filter)
}

/// Load all recipes from a JSON file.
///
/// # Errors
///
/// Returns `ForgeError::NotFound` if the file is missing.
pub fn load_recipes(path: &Path) -> Result<BTreeMap<String, Recipe>> {
    if !path.exists() {
        return Err(ForgeError::NotFound(format!(
            "Recipe file {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| ForgeError::Catalog(format!("Invalid recipes {}: {}", path.display(), e)))
}
