//! Deck packing and package output.
//!
//! - `deck`: deck policy, stable deck ids, grouping
//! - `model`: note models and field projection
//! - `media`: media references in field values
//! - `package`: package contents and the `PackageWriter` interface
//! - `apkg`: Anki `.apkg` writer
//! - `packer`: `DeckPacker`, which ties the above together

pub mod apkg;
pub mod deck;
pub mod media;
pub mod model;
pub mod package;
pub mod packer;

pub use apkg::ApkgWriter;
pub use deck::{deck_id, DeckPolicy, DEFAULT_DECK_ID, FALLBACK_DECK};
pub use model::{FieldProjection, ModelDescriptor};
pub use package::{PackSummary, Package, PackageWriter};
pub use packer::DeckPacker;
