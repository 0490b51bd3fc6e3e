//! Engine configuration applied to every connection right after it is opened.

use crate::db::config::DbConfig;
use rusqlite::{Connection, Result};
use serde::Serialize;

/// Apply WAL journaling, FK enforcement, NORMAL sync, page cache budget,
/// in-memory temp storage and the busy timeout.
///
/// The busy timeout goes first so that switching the journal mode on a file
/// another connection is writing waits instead of failing.
pub fn apply_pragmas(conn: &Connection, config: &DbConfig) -> Result<()> {
    conn.busy_timeout(config.busy_timeout)?;

    // journal_mode answers with the mode actually in effect ("memory" for
    // in-memory databases), so read it back instead of plain execute.
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    conn.execute_batch(&format!(
        r#"
        PRAGMA foreign_keys = ON;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -{};
        PRAGMA temp_store = MEMORY;
        "#,
        config.cache_size_kib
    ))?;

    Ok(())
}

/// Engine settings as reported by a live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PragmaSnapshot {
    pub journal_mode: String,
    pub foreign_keys: bool,
    /// 0 = OFF, 1 = NORMAL, 2 = FULL, 3 = EXTRA
    pub synchronous: i64,
    pub cache_size: i64,
    /// 0 = DEFAULT, 1 = FILE, 2 = MEMORY
    pub temp_store: i64,
    pub busy_timeout_ms: i64,
}

pub fn read_pragmas(conn: &Connection) -> Result<PragmaSnapshot> {
    let int = |name: &str| -> Result<i64> { conn.pragma_query_value(None, name, |row| row.get(0)) };

    Ok(PragmaSnapshot {
        journal_mode: conn.pragma_query_value(None, "journal_mode", |row| row.get(0))?,
        foreign_keys: int("foreign_keys")? == 1,
        synchronous: int("synchronous")?,
        cache_size: int("cache_size")?,
        temp_store: int("temp_store")?,
        busy_timeout_ms: int("busy_timeout")?,
    })
}
