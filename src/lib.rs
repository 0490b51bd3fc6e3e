//! fdtsdb library root.
//!
//! The core is [`db::DatabaseManager`]: a bounded SQLite connection pool with
//! a transactional query façade that repositories and services share. The
//! rest of the crate is the administration CLI built on top of it.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod logging;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Stats { .. } => cli::commands::stats::handle(&cli.command, cfg),
        Commands::Backup { .. } => cli::commands::backup::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Query { .. } => cli::commands::query::handle(&cli.command, cfg),
        Commands::Exec { .. } => cli::commands::exec::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    // config is loaded once, then command-line overrides are applied
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(dir) = &cli.backup_dir {
        cfg.backup_dir = dir.clone();
    }
    if let Some(max) = cli.max_connections {
        cfg.max_connections = max;
    }

    dispatch(&cli, &cfg)
}
