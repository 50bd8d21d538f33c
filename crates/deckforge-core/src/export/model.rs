//! Note models and field projection.

use crate::catalog::NoteType;
use crate::error::{ForgeError, Result};
use crate::storage::Card;

/// One card template of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    pub name: String,
    /// Question side
    pub qfmt: String,
    /// Answer side
    pub afmt: String,
}

/// Model (note type) as written into a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<CardTemplate>,
}

impl ModelDescriptor {
    /// Build the model for a note type.
    ///
    /// The question shows the first field; the answer repeats the question and
    /// lists every remaining field.
    pub fn from_note_type(note_type: &NoteType) -> Self {
        let front = note_type.front_field();
        let answer_fields: String = note_type
            .fields
            .iter()
            .skip(1)
            .map(|field| format!("{{{{{}}}}}<br>", field))
            .collect();

        Self {
            id: note_type.model_id,
            name: note_type.name.clone(),
            fields: note_type.fields.clone(),
            templates: vec![CardTemplate {
                name: "Card 1".to_string(),
                qfmt: format!("{{{{{}}}}}", front),
                afmt: format!("{{{{FrontSide}}}}<hr id=\"answer\">{}", answer_fields),
            }],
        }
    }
}

/// How a card's field map is turned into the model's positional field list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldProjection {
    /// Keys must equal the declared fields exactly
    #[default]
    Strict,
    /// Missing fields become empty strings; unknown keys are dropped
    Lenient,
}

/// Project `card.fields` into `note_type.fields` order.
///
/// # Errors
///
/// Under `FieldProjection::Strict`, returns `ForgeError::FieldMismatch` when
/// the card lacks a declared field or carries an undeclared one.
pub fn project_fields(
    card: &Card,
    note_type: &NoteType,
    mode: FieldProjection,
) -> Result<Vec<String>> {
    if mode == FieldProjection::Strict {
        let missing: Vec<String> = note_type
            .fields
            .iter()
            .filter(|field| !card.fields.contains_key(*field))
            .cloned()
            .collect();
        let unexpected: Vec<String> = card
            .fields
            .keys()
            .filter(|key| !note_type.fields.contains(*key))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ForgeError::FieldMismatch {
                guid: card.guid.clone(),
                note_type: card.note_type.clone(),
                missing,
                unexpected,
            });
        }
    }

    Ok(note_type
        .fields
        .iter()
        .map(|field| card.fields.get(field).cloned().unwrap_or_default())
        .collect())
}
