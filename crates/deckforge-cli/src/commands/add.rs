//! Add command: one card from flags/prompts, or many from an import file.

use std::path::Path;

use deckforge_core::import::{parse_import, ImportLine};
use deckforge_core::storage::{JsonlStore, NewCard};
use deckforge_core::{CardRepository, NoteType};

use crate::app::{exit_not_found_with_hint, AppContext};
use crate::cli::AddArgs;
use crate::helpers::{clean_tags, is_interactive, parse_cli_fields, prompt_for_fields};
use crate::output::warn;

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let note_type = ctx.note_type(&args.note_type)?;
    let tags = clean_tags(&args.tags);
    let mut store = ctx.store()?;

    if let Some(ref file) = args.file {
        return import_file(ctx, &mut store, &args.note_type, note_type, file, &tags);
    }

    let provided = parse_cli_fields(&args.fields, note_type)?;
    let interactive = is_interactive(args.no_input);
    let fields = prompt_for_fields(note_type, &provided, None, interactive)?;

    let mut new_card = NewCard::new(args.note_type.clone(), fields).with_tags(tags);
    if let Some(ref guid) = args.guid {
        new_card = new_card.with_guid(guid.clone());
    }
    let guid = store.create(&new_card)?;

    if ctx.quiet() {
        println!("{}", guid);
    } else {
        println!("Added card {}", guid);
    }
    Ok(())
}

fn import_file(
    ctx: &AppContext,
    store: &mut JsonlStore,
    key: &str,
    note_type: &NoteType,
    file: &Path,
    tags: &[String],
) -> anyhow::Result<()> {
    if !file.exists() {
        exit_not_found_with_hint(
            &format!("Import file not found: {}", file.display()),
            "Hint: Each line holds field values separated by `::`.",
        );
    }
    let contents = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;

    let mut added = 0usize;
    let mut skipped = 0usize;
    for line in parse_import(&contents, note_type) {
        match line {
            ImportLine::Card { fields, .. } => {
                store.create(&NewCard::new(key, fields).with_tags(tags.to_vec()))?;
                added += 1;
            }
            ImportLine::Skipped {
                line,
                expected,
                found,
                text,
            } => {
                warn(&format!(
                    "line {}: expected {} fields, found {}: {}",
                    line, expected, found, text
                ));
                skipped += 1;
            }
        }
    }

    if !ctx.quiet() {
        println!(
            "Imported {} card(s) from {} ({} skipped)",
            added,
            file.display(),
            skipped
        );
    }
    Ok(())
}
