//! Deckforge CLI - author flashcards as plain records and pack Anki decks
//!
//! This is the command-line interface for Deckforge. It wires the core
//! library's card store and deck packer to a small command surface.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod helpers;
mod output;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("deckforge_core=debug,deckforge_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = AppContext::new(&cli);
    match &cli.command {
        Some(Commands::Add(args)) => commands::handle_add(&ctx, args),
        Some(Commands::List(args)) => commands::handle_list(&ctx, args),
        Some(Commands::Show(args)) => commands::handle_show(&ctx, args),
        Some(Commands::Edit(args)) => commands::handle_edit(&ctx, args),
        Some(Commands::Delete(args)) => commands::handle_delete(&ctx, args),
        Some(Commands::Pack(args)) => commands::handle_pack(&ctx, args),
        Some(Commands::Types) => commands::handle_types(&ctx),
        Some(Commands::Completions(args)) => {
            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "deckforge", &mut std::io::stdout());
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
