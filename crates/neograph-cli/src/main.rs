mod cli;
mod commands;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    let config = commands::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Augment(args) => commands::augment(args, &config)?,
        Commands::Scope(args) => commands::scope(args, &config),
    }

    Ok(())
}
