use crate::cli::commands::open_manager;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let manager = open_manager(cfg)?;
        LogLogic::print_log(&manager)?;
        manager.close();
    }

    Ok(())
}
