use crate::cli::parser::Cli;
use crate::cli::commands::open_manager;
use crate::config::Config;
use crate::db::log;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the data and backup directories
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let cfg = Config::init_all(cfg.clone(), !cli.test)?;

    println!("⚙️  Initializing fdtsdb…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", cfg.database);
    println!("💾 Backups    : {}", cfg.backup_dir);

    let manager = open_manager(&cfg)?;

    // internal log is best effort
    if let Err(e) = manager.with_main_connection(|conn| {
        log::write_log(
            conn,
            "init",
            "Database initialized",
            &format!("Database initialized at {}", cfg.database),
        )
    }) {
        warning(format!("Failed to write internal log: {}", e));
    }

    manager.close();
    success(format!("Database initialized at {}", cfg.database));
    Ok(())
}
