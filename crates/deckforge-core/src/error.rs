//! Error types for Deckforge core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;

/// Result type alias for Deckforge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Core error type for Deckforge operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found (note type, recipe, card, file)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Note type catalog or recipe definitions are unusable
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A line of the card log could not be parsed
    #[error("Corrupt record on line {line}: {reason}")]
    CorruptRecord { line: usize, reason: String },

    /// A card's field keys disagree with its note type's declared fields
    #[error(
        "Fields of card {guid} do not match note type \"{note_type}\" (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    FieldMismatch {
        guid: String,
        note_type: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Package serialization error
    #[error("Package error: {0}")]
    Package(String),
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Validation(err.to_string())
    }
}

impl From<rusqlite::Error> for ForgeError {
    fn from(err: rusqlite::Error) -> Self {
        ForgeError::Package(format!("SQLite error: {}", err))
    }
}

impl From<zip::result::ZipError> for ForgeError {
    fn from(err: zip::result::ZipError) -> Self {
        ForgeError::Package(format!("Zip error: {}", err))
    }
}
