use crate::cli::commands::open_manager;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::exec::update;
use crate::db::log::write_log;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Exec { sql } = cmd {
        let manager = open_manager(cfg)?;

        // the statement and its audit row commit together
        let res = manager.execute_transaction(|conn| {
            let res = update(conn, sql, &[])?;
            write_log(
                conn,
                "exec",
                &format!("{} row(s)", res.changes),
                sql.trim(),
            )?;
            Ok(res)
        })?;
        manager.close();

        success(format!(
            "{} row(s) changed, last insert id {}",
            res.changes, res.last_insert_id
        ));
    }

    Ok(())
}
