use crate::cli::commands::open_manager;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::ui::messages::success;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup { file, compress } = cmd {
        let manager = open_manager(cfg)?;
        let path = BackupLogic::backup(&manager, file.as_deref().map(Path::new), *compress)?;
        manager.close();
        success(format!("Backup created: {}", path.display()));
    }

    Ok(())
}
