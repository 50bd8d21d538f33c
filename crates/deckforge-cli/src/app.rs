//! Application context for the Deckforge CLI.
//!
//! Bundles the parsed CLI arguments with the lazily loaded config, catalog and
//! library paths so handlers don't thread them around individually.

use std::collections::BTreeMap;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use deckforge_core::recipe::load_recipes;
use deckforge_core::storage::JsonlStore;
use deckforge_core::{Catalog, ForgeError, NoteType, Recipe};

use crate::cli::Cli;
use crate::config::{default_library_root, load_config, DeckforgeConfig};
use crate::constants::{exit_codes, CATALOG_FILE, LIBRARY_FILE, MEDIA_DIR, RECIPES_FILE};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<DeckforgeConfig>,
    root: OnceCell<PathBuf>,
    catalog: OnceCell<Catalog>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            root: OnceCell::new(),
            catalog: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&DeckforgeConfig> {
        self.config.get_or_try_init(load_config)
    }

    /// Library root: `--root` / `DECKFORGE_ROOT`, then config, then the XDG data dir.
    pub fn root(&self) -> anyhow::Result<&PathBuf> {
        self.root.get_or_try_init(|| {
            if let Some(root) = self.cli.root.clone() {
                return Ok(root);
            }
            if let Some(root) = self.config()?.library.root.as_ref() {
                if !root.trim().is_empty() {
                    return Ok(PathBuf::from(root));
                }
            }
            default_library_root()
        })
    }

    pub fn media_dir(&self) -> anyhow::Result<PathBuf> {
        Ok(self.root()?.join(MEDIA_DIR))
    }

    /// Open the card store with the configured corrupt-line policy.
    pub fn store(&self) -> anyhow::Result<JsonlStore> {
        let store = JsonlStore::new(self.root()?.join(LIBRARY_FILE))
            .with_policy(self.config()?.store.corrupt_lines);
        tracing::debug!(
            path = %store.path().display(),
            policy = ?store.policy(),
            "Opening card store"
        );
        Ok(store)
    }

    /// The note type catalog. Exits with a hint when the file is missing.
    pub fn catalog(&self) -> anyhow::Result<&Catalog> {
        self.catalog.get_or_try_init(|| {
            let path = self.root()?.join(CATALOG_FILE);
            match Catalog::load(&path) {
                Ok(catalog) => Ok(catalog),
                Err(ForgeError::NotFound(_)) => exit_not_found_with_hint(
                    &format!("Note type catalog not found at {}", path.display()),
                    "Hint: Create config/note_types.json under the library root or pass --root.",
                ),
                Err(err) => Err(err.into()),
            }
        })
    }

    /// The catalog when it can be loaded, for display-only ordering.
    pub fn catalog_if_present(&self) -> Option<&Catalog> {
        if let Some(catalog) = self.catalog.get() {
            return Some(catalog);
        }
        let path = self.root().ok()?.join(CATALOG_FILE);
        match Catalog::load(&path) {
            Ok(catalog) => self.catalog.set(catalog).ok().and(self.catalog.get()),
            Err(err) => {
                tracing::debug!(error = %err, "Catalog unavailable for display");
                None
            }
        }
    }

    /// Look up a note type, exiting with a hint when it is unknown.
    pub fn note_type(&self, key: &str) -> anyhow::Result<&NoteType> {
        let catalog = self.catalog()?;
        Ok(catalog.get(key).unwrap_or_else(|| {
            exit_not_found_with_hint(
                &format!("Note type \"{}\" not found", key),
                "Hint: Run `deckforge types` to list available note types.",
            )
        }))
    }

    /// Load a named recipe, exiting with a hint when it or the file is missing.
    pub fn recipe(&self, name: &str) -> anyhow::Result<Recipe> {
        let path = self.root()?.join(RECIPES_FILE);
        let mut recipes: BTreeMap<String, Recipe> = match load_recipes(&path) {
            Ok(recipes) => recipes,
            Err(ForgeError::NotFound(_)) => exit_not_found_with_hint(
                &format!("Recipe file not found at {}", path.display()),
                "Hint: Create config/recipes.json under the library root.",
            ),
            Err(err) => return Err(err.into()),
        };
        Ok(recipes.remove(name).unwrap_or_else(|| {
            exit_not_found_with_hint(
                &format!("Recipe \"{}\" not found", name),
                &format!("Hint: Define it in {}.", path.display()),
            )
        }))
    }
}

pub fn exit_not_found_with_hint(message: &str, hint: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", hint);
    std::process::exit(exit_codes::NOT_FOUND);
}

pub fn exit_card_not_found(guid: &str) -> ! {
    exit_not_found_with_hint(
        &format!("Card \"{}\" not found", guid),
        "Hint: Run `deckforge list` to find card GUIDs.",
    )
}
