use deckforge_core::storage::CardFilter;
use deckforge_core::CardRepository;

use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::helpers::parse_output_format;
use crate::output::print_card_list;

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let format = parse_output_format(args.format.as_deref())?;
    let store = ctx.store()?;

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

    let cards = store.list(&filter)?;
    print_card_list(&cards, ctx.catalog_if_present(), args.json, format, ctx.quiet())
}
