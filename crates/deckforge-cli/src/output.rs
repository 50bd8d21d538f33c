//! Output formatting helpers for the CLI.

use std::io::IsTerminal;

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use deckforge_core::export::PackSummary;
use deckforge_core::storage::Card;
use deckforge_core::Catalog;

use crate::helpers::OutputFormat;

const SUMMARY_MAX: usize = 60;

/// Whether stdout gets colors.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM").map(|v| v != "dumb").unwrap_or(true)
}

/// Convert a card to JSON for output.
pub fn card_json(card: &Card) -> serde_json::Value {
    serde_json::json!({
        "guid": card.guid,
        "note_type": card.note_type,
        "fields": card.fields,
        "tags": card.tags,
        "created_at": card.created_at,
        "updated_at": card.updated_at,
    })
}

/// First field value in the note type's order, truncated for tables.
pub fn card_summary(card: &Card, catalog: Option<&Catalog>) -> String {
    let front = catalog
        .and_then(|catalog| catalog.get(&card.note_type))
        .and_then(|note_type| card.fields.get(note_type.front_field()))
        .or_else(|| card.fields.values().next())
        .map(String::as_str)
        .unwrap_or("");
    truncate(&front.replace('\n', " "), SUMMARY_MAX)
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn print_card_list(
    cards: &[Card],
    catalog: Option<&Catalog>,
    json: bool,
    format: Option<OutputFormat>,
    quiet: bool,
) -> anyhow::Result<()> {
    if json {
        if format.is_some() {
            return Err(anyhow::anyhow!("--format cannot be used with --json"));
        }
        let values: Vec<serde_json::Value> = cards.iter().map(card_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    match format.unwrap_or(OutputFormat::Table) {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(presets::NOTHING);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            if !quiet {
                let color = use_color();
                let header: Vec<Cell> = ["GUID", "NOTE TYPE", "TAGS", "SUMMARY"]
                    .into_iter()
                    .map(|title| {
                        let cell = Cell::new(title);
                        if color {
                            cell.add_attribute(Attribute::Dim)
                        } else {
                            cell
                        }
                    })
                    .collect();
                table.set_header(header);
            }
            for card in cards {
                table.add_row(vec![
                    card.guid.clone(),
                    card.note_type.clone(),
                    card.tags.join(","),
                    card_summary(card, catalog),
                ]);
            }
            if !cards.is_empty() || !quiet {
                println!("{}", table);
            }
        }
        OutputFormat::Plain => {
            for card in cards {
                println!(
                    "{}\t{}\t{}\t{}",
                    card.guid,
                    card.note_type,
                    card.tags.join(","),
                    card_summary(card, catalog)
                );
            }
        }
    }
    Ok(())
}

/// Print a single card in human-readable format.
pub fn print_card(card: &Card, catalog: Option<&Catalog>, quiet: bool) {
    if !quiet {
        println!("GUID: {}", card.guid);
        println!("Note type: {}", card.note_type);
        println!("Created: {}", card.created_at.to_rfc3339());
        if let Some(updated) = card.updated_at {
            println!("Updated: {}", updated.to_rfc3339());
        }
        if !card.tags.is_empty() {
            println!("Tags: {}", card.tags.join(", "));
        }
        println!();
    }

    // Declared order first, then anything the note type doesn't know about.
    let declared: Vec<&String> = catalog
        .and_then(|catalog| catalog.get(&card.note_type))
        .map(|note_type| note_type.fields.iter().collect())
        .unwrap_or_default();
    for name in &declared {
        if let Some(value) = card.fields.get(*name) {
            println!("{}: {}", name, value);
        }
    }
    for (name, value) in &card.fields {
        if !declared.contains(&name) {
            println!("{}: {}", name, value);
        }
    }
}

pub fn print_pack_summary(summary: &PackSummary) {
    let color = use_color();
    let path = summary.output.display().to_string();
    if color {
        println!(
            "{} {} note(s) to {}",
            "Packed".green().bold(),
            summary.note_count(),
            path.bold()
        );
    } else {
        println!("Packed {} note(s) to {}", summary.note_count(), path);
    }
    for (deck, count) in &summary.decks {
        println!("  {}: {}", deck, count);
    }
    if summary.media_files > 0 {
        println!("  media files: {}", summary.media_files);
    }
}

/// Print a warning line to stderr.
pub fn warn(message: &str) {
    if std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
        eprintln!("{} {}", "Warning:".yellow().bold(), message);
    } else {
        eprintln!("Warning: {}", message);
    }
}
