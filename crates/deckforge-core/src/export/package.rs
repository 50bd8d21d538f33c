//! Package contents and the writer interface.

use std::path::{Path, PathBuf};

use super::model::ModelDescriptor;
use crate::error::Result;

/// A note ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedNote {
    pub guid: String,
    pub model_id: i64,
    /// Field values in model order
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

/// A deck and its notes in pack order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDeck {
    pub id: i64,
    pub name: String,
    pub notes: Vec<PackedNote>,
}

/// Everything a package file holds.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub decks: Vec<PackedDeck>,
    pub models: Vec<ModelDescriptor>,
    pub media: Vec<PathBuf>,
}

impl Package {
    pub fn note_count(&self) -> usize {
        self.decks.iter().map(|deck| deck.notes.len()).sum()
    }

    pub fn summary(&self, output: &Path) -> PackSummary {
        PackSummary {
            output: output.to_path_buf(),
            decks: self
                .decks
                .iter()
                .map(|deck| (deck.name.clone(), deck.notes.len()))
                .collect(),
            media_files: self.media.len(),
        }
    }
}

/// What a pack run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub output: PathBuf,
    /// Deck name and note count, in package order
    pub decks: Vec<(String, usize)>,
    pub media_files: usize,
}

impl PackSummary {
    pub fn note_count(&self) -> usize {
        self.decks.iter().map(|(_, count)| count).sum()
    }
}

/// Serializes a `Package` to a file.
///
/// The package format is owned by the implementation; the packer only builds
/// the `Package`.
pub trait PackageWriter {
    fn write(&self, package: &Package, output: &Path) -> Result<()>;
}
