//! Input and parsing helper functions for the CLI.

use std::io::IsTerminal;

use dialoguer::Input;

use deckforge_core::storage::FieldMap;
use deckforge_core::NoteType;

/// Output format for the list command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Plain,
}

/// Parse output format string.
pub fn parse_output_format(value: Option<&str>) -> anyhow::Result<Option<OutputFormat>> {
    match value {
        None => Ok(None),
        Some("table") => Ok(Some(OutputFormat::Table)),
        Some("plain") => Ok(Some(OutputFormat::Plain)),
        Some(other) => Err(anyhow::anyhow!(
            "Unsupported format: {} (use table or plain)",
            other
        )),
    }
}

/// Whether prompts may be shown.
pub fn is_interactive(no_input: bool) -> bool {
    !no_input && std::io::stdin().is_terminal()
}

/// Parse CLI field arguments (NAME=VALUE format) against a note type.
pub fn parse_cli_fields(fields: &[String], note_type: &NoteType) -> anyhow::Result<FieldMap> {
    let mut result = FieldMap::new();
    for field in fields {
        let (key, value) = field.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("Invalid field format '{}'. Use NAME=VALUE", field)
        })?;
        let key = key.trim();
        if !note_type.fields.iter().any(|name| name == key) {
            return Err(anyhow::anyhow!(
                "Unknown field '{}' for note type \"{}\" (fields: {})",
                key,
                note_type.name,
                note_type.fields.join(", ")
            ));
        }
        result.insert(key.to_string(), value.to_string());
    }
    Ok(result)
}

/// Trim tags and drop empty ones, keeping order and duplicates.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fill every declared field of `note_type`.
///
/// Values come from `provided` first, then an interactive prompt (pre-filled
/// from `current` when editing), then `current` alone when prompting is off.
pub fn prompt_for_fields(
    note_type: &NoteType,
    provided: &FieldMap,
    current: Option<&FieldMap>,
    interactive: bool,
) -> anyhow::Result<FieldMap> {
    let mut values = FieldMap::new();
    for name in &note_type.fields {
        if let Some(value) = provided.get(name) {
            values.insert(name.clone(), value.clone());
            continue;
        }
        let existing = current.and_then(|fields| fields.get(name));
        let value = if interactive {
            let mut input = Input::<String>::new().with_prompt(name).allow_empty(true);
            if let Some(existing) = existing {
                input = input.default(existing.clone());
            }
            input
                .interact_text()
                .map_err(|e| anyhow::anyhow!("Failed to read field '{}': {}", name, e))?
        } else if let Some(existing) = existing {
            existing.clone()
        } else {
            return Err(anyhow::anyhow!(
                "Missing value for field '{}'. Use --field {}=VALUE",
                name,
                name
            ));
        };
        values.insert(name.clone(), value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> NoteType {
        NoteType {
            name: "Vocabulary".to_string(),
            model_id: 1,
            default_deck: None,
            fields: vec!["front".to_string(), "back".to_string()],
        }
    }

    #[test]
    fn test_parse_cli_fields() {
        let fields = parse_cli_fields(
            &["front=dog".to_string(), "back=le chien = a dog".to_string()],
            &vocab(),
        )
        .unwrap();
        assert_eq!(fields.get("front").map(String::as_str), Some("dog"));
        assert_eq!(
            fields.get("back").map(String::as_str),
            Some("le chien = a dog")
        );
    }

    #[test]
    fn test_parse_cli_fields_rejects_bad_input() {
        assert!(parse_cli_fields(&["front".to_string()], &vocab()).is_err());
        assert!(parse_cli_fields(&["side=x".to_string()], &vocab()).is_err());
    }

    #[test]
    fn test_clean_tags() {
        let tags = clean_tags(&[" a ".to_string(), String::new(), "b".to_string()]);
        assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format(None).unwrap(), None);
        assert_eq!(
            parse_output_format(Some("plain")).unwrap(),
            Some(OutputFormat::Plain)
        );
        assert!(parse_output_format(Some("csv")).is_err());
    }

    #[test]
    fn test_fields_without_prompt() {
        let mut provided = FieldMap::new();
        provided.insert("front".to_string(), "dog".to_string());
        let mut current = FieldMap::new();
        current.insert("front".to_string(), "cat".to_string());
        current.insert("back".to_string(), "chat".to_string());

        let merged = prompt_for_fields(&vocab(), &provided, Some(&current), false).unwrap();
        assert_eq!(merged.get("front").map(String::as_str), Some("dog"));
        assert_eq!(merged.get("back").map(String::as_str), Some("chat"));

        assert!(prompt_for_fields(&vocab(), &provided, None, false).is_err());
    }
}
