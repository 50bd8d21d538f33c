use deckforge_core::CardRepository;

use crate::app::{exit_card_not_found, AppContext};
use crate::cli::DeleteArgs;

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let mut store = ctx.store()?;
    if !store.delete(&args.guid)? {
        exit_card_not_found(&args.guid);
    }
    if !ctx.quiet() {
        println!("Deleted card {}", args.guid);
    }
    Ok(())
}
