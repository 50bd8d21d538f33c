//! Bulk import of `::`-separated lines.
//!
//! Each line holding `::` is split on it and the trimmed parts are mapped onto
//! the note type's fields in order:
//!
//! ```text
//! dog :: chien
//! cat :: chat
//! ```
//!
//! Lines with the wrong number of parts are reported, not fatal. Lines
//! without `::` are ignored.

use crate::catalog::NoteType;
use crate::storage::FieldMap;

pub const FIELD_SEPARATOR: &str = "::";

/// Outcome of one import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportLine {
    /// Parsed field values
    Card { line: usize, fields: FieldMap },
    /// Part count did not match the note type
    Skipped {
        line: usize,
        expected: usize,
        found: usize,
        text: String,
    },
}

/// Parse import text against a note type.
pub fn parse_import(contents: &str, note_type: &NoteType) -> Vec<ImportLine> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, text)| text.contains(FIELD_SEPARATOR))
        .map(|(idx, text)| parse_line(idx + 1, text, note_type))
        .collect()
}

fn parse_line(line: usize, text: &str, note_type: &NoteType) -> ImportLine {
    let parts: Vec<&str> = text.split(FIELD_SEPARATOR).map(str::trim).collect();
    if parts.len() != note_type.fields.len() {
        return ImportLine::Skipped {
            line,
            expected: note_type.fields.len(),
            found: parts.len(),
            text: text.trim().to_string(),
        };
    }
    let fields = note_type
        .fields
        .iter()
        .cloned()
        .zip(parts.into_iter().map(str::to_string))
        .collect();
    ImportLine::Card { line, fields }
}
