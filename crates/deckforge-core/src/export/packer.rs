//! Deck packer: turns stored cards into a package.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::info;

use super::deck::{group_by_deck, DeckPolicy};
use super::media::MediaCollector;
use super::model::{project_fields, FieldProjection, ModelDescriptor};
use super::package::{PackSummary, Package, PackageWriter, PackedDeck, PackedNote};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::storage::Card;

/// Builds packages from cards using a note type catalog.
#[derive(Debug, Clone)]
pub struct DeckPacker<'a> {
    catalog: &'a Catalog,
    media_dir: PathBuf,
    projection: FieldProjection,
}

impl<'a> DeckPacker<'a> {
    pub fn new(catalog: &'a Catalog, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            media_dir: media_dir.into(),
            projection: FieldProjection::default(),
        }
    }

    pub fn with_projection(mut self, projection: FieldProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Assemble the package for `cards` without writing it.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::NotFound` for a card whose note type is not in the
    /// catalog, and `ForgeError::FieldMismatch` under strict projection.
    pub fn build(&self, cards: &[Card], policy: &DeckPolicy) -> Result<Package> {
        let mut models: Vec<ModelDescriptor> = Vec::new();
        let mut seen_note_types: HashSet<&str> = HashSet::new();
        let mut media = MediaCollector::new(&self.media_dir);
        let mut decks = Vec::new();

        for group in group_by_deck(cards, policy, self.catalog) {
            let mut notes = Vec::with_capacity(group.cards.len());
            for card in group.cards {
                let note_type = self.catalog.require(&card.note_type)?;
                if seen_note_types.insert(card.note_type.as_str()) {
                    models.push(ModelDescriptor::from_note_type(note_type));
                }

                let fields = project_fields(card, note_type, self.projection)?;
                for value in &fields {
                    media.scan(value);
                }

                notes.push(PackedNote {
                    guid: card.guid.clone(),
                    model_id: note_type.model_id,
                    fields,
                    tags: card.tags.clone(),
                });
            }
            decks.push(PackedDeck {
                id: group.id,
                name: group.name,
                notes,
            });
        }

        Ok(Package {
            decks,
            models,
            media: media.into_files(),
        })
    }

    /// Build the package for `cards` and write it to `output`.
    pub fn pack(
        &self,
        cards: &[Card],
        policy: &DeckPolicy,
        writer: &dyn PackageWriter,
        output: &Path,
    ) -> Result<PackSummary> {
        let package = self.build(cards, policy)?;
        writer.write(&package, output)?;
        let summary = package.summary(output);
        info!(
            output = %output.display(),
            decks = summary.decks.len(),
            notes = summary.note_count(),
            media = summary.media_files,
            "Packed cards"
        );
        Ok(summary)
    }
}
