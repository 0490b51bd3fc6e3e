use crate::cli::commands::open_manager;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::stats::print_stats;
use crate::errors::{AppError, AppResult};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stats { json } = cmd {
        let manager = open_manager(cfg)?;
        let stats = manager.get_stats()?;
        manager.close();

        if *json {
            let out =
                serde_json::to_string_pretty(&stats).map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", out);
        } else {
            print_stats(&stats);
        }
    }

    Ok(())
}
