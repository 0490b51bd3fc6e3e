//! Maintenance operations. They all run on the main connection so they never
//! compete with callers for pool slots.

use crate::db::exec;
use crate::db::manager::DatabaseManager;
use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::params;
use serde::Serialize;

/// Result of `PRAGMA wal_checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckpointResult {
    pub busy: bool,
    pub log_frames: i64,
    pub checkpointed_frames: i64,
}

impl DatabaseManager {
    /// Lines reported by `PRAGMA integrity_check`; `["ok"]` when healthy.
    pub fn integrity_check(&self) -> AppResult<Vec<String>> {
        self.with_main_connection(|conn| {
            exec::query(conn, "PRAGMA integrity_check", params![], |row| row.get(0))
        })
    }

    pub fn vacuum(&self) -> AppResult<()> {
        self.with_main_connection(|conn| Ok(conn.execute_batch("VACUUM")?))
    }

    /// Copy the WAL into the database file and truncate it.
    pub fn checkpoint(&self) -> AppResult<CheckpointResult> {
        self.with_main_connection(|conn| {
            let res = exec::query_single(conn, "PRAGMA wal_checkpoint(TRUNCATE)", params![], |row| {
                Ok(CheckpointResult {
                    busy: row.get::<_, i64>(0)? != 0,
                    log_frames: row.get(1)?,
                    checkpointed_frames: row.get(2)?,
                })
            })?;
            Ok(res.unwrap_or(CheckpointResult {
                busy: false,
                log_frames: 0,
                checkpointed_frames: 0,
            }))
        })
    }

    /// Apply migrations added since `initialize`. Returns how many ran.
    pub fn migrate(&self) -> AppResult<usize> {
        self.with_main_connection(run_pending_migrations)
    }
}
