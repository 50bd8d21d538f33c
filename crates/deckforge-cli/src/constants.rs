//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (catalog, note type, recipe, card, import file).
    pub const NOT_FOUND: i32 = 3;
}

/// Record log, relative to the library root.
pub const LIBRARY_FILE: &str = "data/library.jsonl";

/// Media source directory, relative to the library root.
pub const MEDIA_DIR: &str = "data/media";

/// Note type catalog, relative to the library root.
pub const CATALOG_FILE: &str = "config/note_types.json";

/// Pack recipes, relative to the library root.
pub const RECIPES_FILE: &str = "config/recipes.json";
