use crate::db::exec;
use crate::errors::AppResult;
use chrono::Local;
use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

/// Write an internal log line into the `log` table.
pub fn write_log(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    // local time, RFC 3339
    let now = Local::now().to_rfc3339();

    exec::update(
        conn,
        "INSERT INTO log (date, operation, target, message) VALUES (?1, ?2, ?3, ?4)",
        params![now, operation, target, message],
    )?;

    Ok(())
}

pub fn read_log(conn: &Connection) -> AppResult<Vec<LogEntry>> {
    exec::query(
        conn,
        "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        params![],
        |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                date: row.get(1)?,
                operation: row.get(2)?,
                target: row.get(3)?,
                message: row.get(4)?,
            })
        },
    )
}
