//! # Deckforge Core
//!
//! Core library for Deckforge - a personal, CLI-first flashcard authoring tool
//! that exports to Anki packages.
//!
//! This crate provides the card store, note type catalog and deck packing logic
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: `CardRepository` trait and the JSON-lines log backend
//! - **catalog**: Note type definitions (field lists, default decks)
//! - **recipe**: Named pack presets and their query syntax
//! - **import**: Bulk import of `::`-separated lines
//! - **export**: Deck grouping, field projection, media scanning, `.apkg` output

pub mod catalog;
pub mod error;
pub mod export;
pub mod fs;
pub mod import;
pub mod recipe;
pub mod storage;

pub use catalog::{Catalog, NoteType};
pub use error::{ForgeError, Result};
pub use recipe::Recipe;
pub use storage::CardRepository;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
