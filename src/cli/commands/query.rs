use crate::cli::commands::open_manager;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::exec::{self, ensure_read_only};
use crate::db::rows::row_to_json;
use crate::errors::{AppError, AppResult};
use serde_json::Value;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Query { sql, single } = cmd {
        let manager = open_manager(cfg)?;

        let value = {
            let conn = manager.get_connection()?;
            // writes go through `exec` so they are audited
            ensure_read_only(&conn, sql)?;

            if *single {
                exec::query_single(&conn, sql, &[], row_to_json)?.unwrap_or(Value::Null)
            } else {
                Value::Array(exec::query(&conn, sql, &[], row_to_json)?)
            }
        };
        manager.close();

        let out = serde_json::to_string_pretty(&value).map_err(|e| AppError::Other(e.to_string()))?;
        println!("{}", out);
    }

    Ok(())
}
