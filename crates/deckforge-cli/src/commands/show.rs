use deckforge_core::CardRepository;

use crate::app::{exit_card_not_found, AppContext};
use crate::cli::ShowArgs;
use crate::output::{card_json, print_card};

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let card = store
        .get(&args.guid)?
        .unwrap_or_else(|| exit_card_not_found(&args.guid));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&card_json(&card))?);
    } else {
        // The catalog only orders fields; show works without one.
        print_card(&card, ctx.catalog_if_present(), ctx.quiet());
    }
    Ok(())
}
