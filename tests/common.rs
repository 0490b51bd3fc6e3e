#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use fdtsdb::db::{DatabaseManager, DbConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Temp directory acting as $HOME plus data and backup locations.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("data").join("fdts.sqlite")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.dir.path().join("backups")
    }

    /// fdtsdb binary pointed at this environment's database and backups.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("fdtsdb");
        cmd.env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--db")
            .arg(self.db_path())
            .arg("--backup-dir")
            .arg(self.backup_dir());
        cmd
    }

    pub fn init(&self) {
        self.cmd().args(["--test", "init"]).assert().success();
    }

    pub fn db_config(&self, max_connections: usize) -> DbConfig {
        DbConfig {
            max_connections,
            acquire_timeout: Some(Duration::from_secs(10)),
            ..DbConfig::new(self.db_path(), self.backup_dir())
        }
    }
}

/// Initialized manager on a fresh database. Keep the env alive for the test.
pub fn manager_with(max_connections: usize) -> (TestEnv, DatabaseManager) {
    let env = TestEnv::new();
    let manager = DatabaseManager::open(env.db_config(max_connections)).expect("open manager");
    (env, manager)
}

pub fn create_items_table(manager: &DatabaseManager) {
    manager
        .execute_update(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            &[],
        )
        .expect("create items");
}

pub fn count_items(manager: &DatabaseManager) -> i64 {
    manager
        .execute_query_single("SELECT COUNT(*) FROM items", &[], |row| row.get(0))
        .expect("count items")
        .unwrap_or(0)
}
