use deckforge_core::storage::{CardUpdate, FieldMap};
use deckforge_core::CardRepository;

use crate::app::{exit_card_not_found, AppContext};
use crate::cli::EditArgs;
use crate::helpers::{clean_tags, is_interactive, parse_cli_fields, prompt_for_fields};

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let mut store = ctx.store()?;
    let card = store
        .get(&args.guid)?
        .unwrap_or_else(|| exit_card_not_found(&args.guid));
    let note_type = ctx.note_type(&card.note_type)?;

    let provided = parse_cli_fields(&args.fields, note_type)?;
    let tags = args.tags.as_deref().map(clean_tags);
    let interactive = is_interactive(args.no_input);

    let mut update = CardUpdate::new();
    if !provided.is_empty() {
        // Flags given: replace only the named fields.
        let mut fields = card.fields.clone();
        fields.extend(provided);
        update = update.fields(fields);
    }
    if let Some(tags) = tags {
        update = update.tags(tags);
    }
    if update.is_empty() {
        if !interactive {
            return Err(anyhow::anyhow!(
                "Nothing to change. Use --field NAME=VALUE or --tags"
            ));
        }
        let fields = prompt_for_fields(note_type, &FieldMap::new(), Some(&card.fields), true)?;
        update = update.fields(fields);
    }

    if !store.update(&args.guid, &update)? {
        exit_card_not_found(&args.guid);
    }
    if !ctx.quiet() {
        println!("Updated card {}", args.guid);
    }
    Ok(())
}
