pub mod backup;
pub mod config;
pub mod db;
pub mod exec;
pub mod init;
pub mod log;
pub mod query;
pub mod stats;

use crate::config::Config;
use crate::db::manager::DatabaseManager;
use crate::errors::AppResult;

/// Open and initialize a manager for one command invocation.
pub(crate) fn open_manager(cfg: &Config) -> AppResult<DatabaseManager> {
    DatabaseManager::open(cfg.db_config())
}
