//! Connection pool manager and transactional query façade.
//!
//! Repositories and services receive a shared `DatabaseManager` at startup and
//! never open, configure or close connections themselves.

use crate::db::config::DbConfig;
use crate::db::exec::{self, UpdateResult};
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::{ConnectionPool, PooledConnection, close_connection};
use crate::db::stats::DbStats;
use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, Row, ToSql};
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{error, info, warn};

pub struct DatabaseManager {
    config: DbConfig,
    pool: ConnectionPool,
    /// Long-lived connection reserved for schema setup and maintenance.
    /// `Some` exactly while the manager is initialized.
    main: Mutex<Option<Connection>>,
}

impl DatabaseManager {
    pub fn new(config: DbConfig) -> Self {
        Self {
            pool: ConnectionPool::new(config.clone()),
            config,
            main: Mutex::new(None),
        }
    }

    /// Build and initialize in one step.
    pub fn open(config: DbConfig) -> AppResult<Self> {
        let manager = Self::new(config);
        manager.initialize()?;
        Ok(manager)
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    fn lock_main(&self) -> MutexGuard<'_, Option<Connection>> {
        self.main.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock_main().is_some()
    }

    /// Create the data and backup directories, open and migrate the main
    /// connection, then pre-fill the pool. Calling it again is a no-op.
    pub fn initialize(&self) -> AppResult<()> {
        let mut main = self.lock_main();
        if main.is_some() {
            return Ok(());
        }

        let conn = self
            .bootstrap()
            .map_err(|e| AppError::Initialization(Box::new(e)))?;
        *main = Some(conn);

        info!(
            path = %self.config.database.display(),
            max_connections = self.config.max_connections,
            "database initialized"
        );
        Ok(())
    }

    fn bootstrap(&self) -> AppResult<Connection> {
        if self.config.max_connections == 0 {
            return Err(AppError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if let Some(parent) = self.config.database.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&self.config.backup_dir)?;

        let conn = self.pool.open_connection()?;
        let applied = run_pending_migrations(&conn)?;
        if applied > 0 {
            info!(applied, "applied schema migrations");
        }

        self.pool.start(self.config.initial_connections())?;
        Ok(conn)
    }

    /// Check out a connection, waiting up to the configured `acquire_timeout`.
    pub fn get_connection(&self) -> AppResult<PooledConnection<'_>> {
        self.pool.acquire(self.config.acquire_timeout)
    }

    /// Check out a connection, failing with `PoolExhausted` after `timeout`.
    pub fn get_connection_timeout(&self, timeout: Duration) -> AppResult<PooledConnection<'_>> {
        self.pool.acquire(Some(timeout))
    }

    /// Explicit form of dropping the guard; surfaces close failures.
    pub fn release_connection(&self, conn: PooledConnection<'_>) -> AppResult<()> {
        conn.release()
    }

    /// Run `work` inside BEGIN/COMMIT on one pooled connection.
    ///
    /// An error from `work` rolls the transaction back and is returned as is.
    /// A failing ROLLBACK is logged and never replaces that error.
    pub fn execute_transaction<T, F>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = self.get_connection()?;

        conn.execute_batch("BEGIN")
            .map_err(|source| AppError::Transaction {
                stage: "BEGIN",
                source,
            })?;

        match work(&conn) {
            Ok(value) => match conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(source) => {
                    rollback(&conn);
                    Err(AppError::Transaction {
                        stage: "COMMIT",
                        source,
                    })
                }
            },
            Err(e) => {
                warn!(error = %e, "transaction failed, rolling back");
                rollback(&conn);
                Err(e)
            }
        }
    }

    pub fn execute_query<T, F>(&self, sql: &str, params: &[&dyn ToSql], map: F) -> AppResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.get_connection()?;
        exec::query(&conn, sql, params, map)
    }

    pub fn execute_query_single<T, F>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: F,
    ) -> AppResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.get_connection()?;
        exec::query_single(&conn, sql, params, map)
    }

    pub fn execute_update(&self, sql: &str, params: &[&dyn ToSql]) -> AppResult<UpdateResult> {
        let conn = self.get_connection()?;
        exec::update(&conn, sql, params)
    }

    /// `true` when a pooled connection answers a trivial SELECT. Never fails.
    pub fn health_check(&self) -> bool {
        match self.execute_query_single("SELECT 1", &[], |row| row.get::<_, i64>(0)) {
            Ok(Some(1)) => true,
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }

    pub fn get_stats(&self) -> AppResult<DbStats> {
        let (page_count, page_size) = {
            let conn = self.get_connection()?;
            let pragma = |sql: &str| -> AppResult<i64> {
                Ok(exec::query_single(&conn, sql, &[], |row| row.get(0))?.unwrap_or(0))
            };
            (pragma("PRAGMA page_count")?, pragma("PRAGMA page_size")?)
        };

        // Counters are read once the stats connection is back in the pool.
        let (active, idle) = self.pool.counts();
        Ok(DbStats {
            active_connections: active,
            pool_size: idle,
            database_size: page_count * page_size,
            page_count,
            page_size,
        })
    }

    /// `(active, idle)` pool counters. Unlike `get_stats` this needs no
    /// connection, so it answers even while the pool is exhausted.
    pub fn connection_counts(&self) -> (usize, usize) {
        self.pool.counts()
    }

    /// Run `f` on the reserved main connection.
    pub fn with_main_connection<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let main = self.lock_main();
        match main.as_ref() {
            Some(conn) => f(conn),
            None => Err(AppError::NotInitialized),
        }
    }

    /// Close pooled connections and the main connection and reset counters.
    /// Safe to call repeatedly and on a manager that was never initialized.
    pub fn close(&self) {
        let mut main = self.lock_main();
        let pooled = self.pool.shutdown();

        if let Some(conn) = main.take() {
            // close_connection logs its own failure
            let _ = close_connection(conn);
            info!(pooled, "database closed");
        }
    }
}

impl Drop for DatabaseManager {
    fn drop(&mut self) {
        self.close();
    }
}

fn rollback(conn: &Connection) {
    if let Err(e) = conn.execute_batch("ROLLBACK") {
        error!(error = %e, "rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_connections_is_an_initialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig {
            max_connections: 0,
            ..DbConfig::new(dir.path().join("db.sqlite"), dir.path().join("backups"))
        };

        let manager = DatabaseManager::new(config);
        let err = manager.initialize().unwrap_err();
        assert!(matches!(err, AppError::Initialization(_)));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn unopenable_path_is_an_initialization_error() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the data directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let manager = DatabaseManager::new(DbConfig::new(
            blocker.join("db.sqlite"),
            dir.path().join("backups"),
        ));
        assert!(matches!(
            manager.initialize(),
            Err(AppError::Initialization(_))
        ));
    }

    #[test]
    fn operations_require_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DatabaseManager::new(DbConfig::new(
            dir.path().join("db.sqlite"),
            dir.path().join("backups"),
        ));

        assert!(matches!(
            manager.execute_update("SELECT 1", &[]),
            Err(AppError::NotInitialized)
        ));
        assert!(matches!(
            manager.with_main_connection(|_| Ok(())),
            Err(AppError::NotInitialized)
        ));
    }
}
