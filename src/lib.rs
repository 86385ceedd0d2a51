//! fieldclock library root.
//! Exposes the CLI parser, the high-level `run()` function and the
//! time-clock modules used by it.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::context::Context;
use cli::parser::{Cli, Commands};
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, ctx: &Context) -> AppResult<()> {
    use cli::commands::*;

    match &cli.command {
        Commands::Init => init::handle(cli, ctx),
        Commands::Config { .. } => config::handle(&cli.command, ctx),
        Commands::In { .. }
        | Commands::Break { .. }
        | Commands::Resume { .. }
        | Commands::Out { .. } => punch::handle(&cli.command, ctx),
        Commands::Status { .. } => status::handle(&cli.command, ctx),
        Commands::List { .. } => list::handle(&cli.command, ctx),
        Commands::Approve { .. } => approve::handle(&cli.command, ctx),
        Commands::Trigger { .. } => trigger::handle(&cli.command, ctx),
        Commands::Tasks { .. } => tasks::handle(&cli.command, ctx),
        Commands::Log { .. } => log::handle(&cli.command, ctx),
        Commands::Export { .. } => export::handle(&cli.command, ctx),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let ctx = Context::from_cli(&cli)?;
    dispatch(&cli, &ctx)
}
