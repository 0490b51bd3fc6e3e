//! Schema migrations, run on the main connection during `initialize`.
//!
//! The applied version is kept in `PRAGMA user_version`; each migration runs
//! in its own transaction together with the version bump.

use crate::db::log::write_log;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use tracing::{debug, warn};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_log_table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT NOT NULL DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: 2,
        name: "index_log_operation",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_log_operation ON log(operation, date);
        "#,
    },
];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

pub fn current_version(conn: &Connection) -> AppResult<i64> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

pub fn pending_migrations(conn: &Connection) -> AppResult<usize> {
    let current = current_version(conn)?;
    Ok(MIGRATIONS.iter().filter(|m| m.version > current).count())
}

/// Apply every migration newer than the stored version. Returns how many ran.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    let current = current_version(conn)?;
    if current > latest_version() {
        warn!(
            current,
            latest = latest_version(),
            "database schema is newer than this build"
        );
    }

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration)
            .map_err(|e| AppError::Migration(format!("{}: {}", migration.name, e)))?;
        debug!(version = migration.version, name = migration.name, "migration applied");

        if let Err(e) = write_log(conn, "migration_applied", migration.name, "Schema migration applied")
        {
            warn!(error = %e, "failed to record migration in log table");
        }
        applied += 1;
    }

    Ok(applied)
}

fn apply(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_is_migrated_to_latest() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(pending_migrations(&conn).unwrap(), MIGRATIONS.len());

        let applied = run_pending_migrations(&conn).unwrap();
        assert_eq!(applied, MIGRATIONS.len());
        assert_eq!(current_version(&conn).unwrap(), latest_version());
        assert_eq!(pending_migrations(&conn).unwrap(), 0);
    }

    #[test]
    fn rerun_is_a_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        assert_eq!(run_pending_migrations(&conn).unwrap(), 0);

        let logged: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(logged, MIGRATIONS.len() as i64);
    }
}
