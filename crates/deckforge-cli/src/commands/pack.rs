use std::path::PathBuf;

use deckforge_core::export::{ApkgWriter, DeckPacker, DeckPolicy, FieldProjection};
use deckforge_core::storage::CardFilter;
use deckforge_core::CardRepository;

use crate::app::AppContext;
use crate::cli::PackArgs;
use crate::output::{print_pack_summary, warn};

pub fn handle_pack(ctx: &AppContext, args: &PackArgs) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let catalog = ctx.catalog()?;

    // Explicit flags win over the recipe, which wins over config.
    let (filter, recipe_deck, recipe_output) = match args.recipe {
        Some(ref name) => {
            let recipe = ctx.recipe(name)?;
            (recipe.filter()?, Some(recipe.deck_name), Some(recipe.output))
        }
        None => {
            let mut filter = CardFilter::new();
            if let Some(ref tag) = args.tag {
                filter = filter.tag(tag.clone());
            }
            if let Some(ref note_type) = args.note_type {
                filter = filter.note_type(note_type.clone());
            }
            if let Some(ref search) = args.search {
                filter = filter.search(search.clone());
            }
            (filter, None, None)
        }
    };

    let deck = args
        .deck
        .clone()
        .or(recipe_deck)
        .or_else(|| config.pack.default_deck.clone());
    let output = args
        .output
        .clone()
        .or(recipe_output)
        .unwrap_or_else(|| PathBuf::from(&config.pack.default_output));
    let projection = if args.lenient {
        FieldProjection::Lenient
    } else {
        FieldProjection::Strict
    };

    let cards = ctx.store()?.list(&filter)?;
    if cards.is_empty() {
        warn("no cards matched; writing an empty package");
    }

    let summary = DeckPacker::new(catalog, ctx.media_dir()?)
        .with_projection(projection)
        .pack(
            &cards,
            &DeckPolicy::from_option(deck),
            &ApkgWriter::new(),
            &output,
        )?;

    if !ctx.quiet() {
        print_pack_summary(&summary);
    }
    Ok(())
}
