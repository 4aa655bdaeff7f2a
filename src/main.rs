mod cli;
mod commands;
mod kinds;
mod manifest;
mod progress;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub manifest: PathBuf,
    pub state: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        api_key: cli.api_key,
        base_url: cli.base_url,
        manifest: cli.manifest,
        state: cli.state,
    };

    match cli.command {
        Command::Validate => commands::validate::run(&ctx),
        Command::Plan => commands::plan::run(&ctx),
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Refresh => commands::refresh::run(&ctx),
        Command::Destroy(args) => commands::destroy::run(&ctx, &args),
        Command::Import { kind, name, id } => commands::import::run(&ctx, kind.into(), &name, &id),
        Command::Show => commands::show::run(&ctx),
        Command::List { kind } => commands::list::run(&ctx, kind.into()),
        Command::Account => commands::account::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "uptimectl", &mut io::stdout());
            Ok(())
        }
    }
}
