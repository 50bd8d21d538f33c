use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use deckforge_core::storage::CorruptLinePolicy;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeckforgeConfig {
    #[serde(default)]
    pub library: LibrarySection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub pack: PackSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LibrarySection {
    pub root: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub corrupt_lines: CorruptLinePolicy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackSection {
    pub default_deck: Option<String>,
    #[serde(default = "default_output")]
    pub default_output: String,
}

impl Default for PackSection {
    fn default() -> Self {
        Self {
            default_deck: None,
            default_output: default_output(),
        }
    }
}

fn default_output() -> String {
    "output.apkg".to_string()
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_library_root() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("DECKFORGE_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config() -> anyhow::Result<DeckforgeConfig> {
    let path = resolve_config_path()?;
    if !path.exists() {
        return Ok(DeckforgeConfig::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> anyhow::Result<DeckforgeConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("deckforge"));
        }
    }
    Ok(home_dir()?.join(".config").join("deckforge"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("deckforge"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("deckforge"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: DeckforgeConfig = toml::from_str("").unwrap();
        assert!(config.library.root.is_none());
        assert_eq!(config.store.corrupt_lines, CorruptLinePolicy::Fail);
        assert_eq!(config.pack.default_output, "output.apkg");
        assert!(config.pack.default_deck.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let config: DeckforgeConfig = toml::from_str(
            r#"
            [library]
            root = "/srv/cards"

            [store]
            corrupt_lines = "skip"

            [pack]
            default_deck = "French"
            default_output = "french.apkg"
            "#,
        )
        .unwrap();
        assert_eq!(config.library.root.as_deref(), Some("/srv/cards"));
        assert_eq!(config.store.corrupt_lines, CorruptLinePolicy::Skip);
        assert_eq!(config.pack.default_deck.as_deref(), Some("French"));
        assert_eq!(config.pack.default_output, "french.apkg");
    }

    #[test]
    fn test_unknown_corrupt_line_policy_rejected() {
        let result: Result<DeckforgeConfig, _> =
            toml::from_str("[store]\ncorrupt_lines = \"ignore\"\n");
        assert!(result.is_err());
    }
}
