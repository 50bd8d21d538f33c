use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use deckforge_core::VERSION;

/// Deckforge - author flashcards as plain records and pack them into Anki decks
#[derive(Parser)]
#[command(name = "deckforge")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Library root (holds data/ and config/)
    #[arg(short, long, global = true, env = "DECKFORGE_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Note type key from config/note_types.json
    #[arg(value_name = "NOTE_TYPE")]
    pub note_type: String,

    /// Tags for the card (comma separated or repeated)
    #[arg(short, long, value_name = "TAG", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Set a field value (NAME=VALUE)
    #[arg(short, long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Use this GUID instead of a generated one
    #[arg(long)]
    pub guid: Option<String>,

    /// Import cards from a `::`-separated text file
    #[arg(long, value_name = "PATH", conflicts_with_all = ["fields", "guid"])]
    pub file: Option<PathBuf>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Card GUID
    #[arg(value_name = "GUID")]
    pub guid: String,

    /// Replace a field value (NAME=VALUE)
    #[arg(short, long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Replace the card's tags (comma separated or repeated)
    #[arg(short, long, value_name = "TAG", value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Filter by note type
    #[arg(long)]
    pub note_type: Option<String>,

    /// Case-insensitive text search across field values
    #[arg(long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Card GUID
    #[arg(value_name = "GUID")]
    pub guid: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Card GUID
    #[arg(value_name = "GUID")]
    pub guid: String,
}

/// Arguments for the `pack` command
#[derive(Args)]
pub struct PackArgs {
    /// Package file to write
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pack every card into this deck
    #[arg(short, long, value_name = "NAME")]
    pub deck: Option<String>,

    /// Use a named recipe from config/recipes.json
    #[arg(long, value_name = "NAME", conflicts_with_all = ["tag", "note_type", "search"])]
    pub recipe: Option<String>,

    /// Only pack cards with this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Only pack cards of this note type
    #[arg(long)]
    pub note_type: Option<String>,

    /// Only pack cards whose fields contain this text
    #[arg(long)]
    pub search: Option<String>,

    /// Fill missing fields with empty values instead of failing
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a card (or import a file of cards)
    Add(AddArgs),

    /// List cards
    List(ListArgs),

    /// Show a card by GUID
    Show(ShowArgs),

    /// Edit a card's fields or tags
    Edit(EditArgs),

    /// Delete a card
    Delete(DeleteArgs),

    /// Pack cards into an Anki .apkg file
    Pack(PackArgs),

    /// List note types from the catalog
    Types,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
