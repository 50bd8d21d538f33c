use crate::app::AppContext;

pub fn handle_types(ctx: &AppContext) -> anyhow::Result<()> {
    let catalog = ctx.catalog()?;
    if catalog.is_empty() && !ctx.quiet() {
        println!("No note types defined.");
        return Ok(());
    }
    for (key, note_type) in catalog.iter() {
        let deck = note_type.default_deck.as_deref().unwrap_or("-");
        if ctx.quiet() {
            println!("{}", key);
        } else {
            println!(
                "{}\t{} (model {})\tdeck: {}\tfields: {}",
                key,
                note_type.name,
                note_type.model_id,
                deck,
                note_type.fields.join(", ")
            );
        }
    }
    Ok(())
}
