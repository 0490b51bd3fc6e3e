//! Engine-facing settings for [`DatabaseManager`](crate::db::manager::DatabaseManager).

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Number of connections opened eagerly by `initialize`, capped by `max_connections`.
pub const INITIAL_POOL_FILL: usize = 3;

/// Settings fixed at construction time of a `DatabaseManager`.
///
/// # Examples
///
/// ```
/// use fdtsdb::db::config::DbConfig;
/// use std::time::Duration;
///
/// let config = DbConfig {
///     max_connections: 4,
///     acquire_timeout: Some(Duration::from_secs(5)),
///     ..DbConfig::new("/tmp/fdts/fdts.sqlite", "/tmp/fdts/backups")
/// };
/// assert_eq!(config.initial_connections(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database file. Its parent directory is created by `initialize`.
    pub database: PathBuf,

    /// Directory receiving backups. Created by `initialize`.
    pub backup_dir: PathBuf,

    /// Hard cap on open pooled connections, idle plus checked out.
    ///
    /// Default: 10
    pub max_connections: usize,

    /// How long `get_connection` waits for a free slot before failing with
    /// `PoolExhausted`. `None` waits forever.
    ///
    /// Default: 30 seconds
    pub acquire_timeout: Option<Duration>,

    /// Engine lock wait before a statement fails with `SQLITE_BUSY`.
    ///
    /// Default: 30 seconds
    pub busy_timeout: Duration,

    /// Page cache budget per connection, in KiB.
    ///
    /// Default: 64000
    pub cache_size_kib: u32,
}

impl DbConfig {
    pub fn new(database: impl AsRef<Path>, backup_dir: impl AsRef<Path>) -> Self {
        Self {
            database: database.as_ref().to_path_buf(),
            backup_dir: backup_dir.as_ref().to_path_buf(),
            max_connections: 10,
            acquire_timeout: Some(Duration::from_secs(30)),
            busy_timeout: Duration::from_secs(30),
            cache_size_kib: 64_000,
        }
    }

    pub fn initial_connections(&self) -> usize {
        INITIAL_POOL_FILL.min(self.max_connections)
    }
}
