use crate::db::config::DbConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// `null` waits forever for a free connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: Option<u64>,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size_kib: u32,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_backup_dir() -> String {
    Config::config_dir()
        .join("backups")
        .to_string_lossy()
        .to_string()
}
fn default_max_connections() -> usize {
    10
}
fn default_acquire_timeout() -> Option<u64> {
    Some(30)
}
fn default_busy_timeout() -> u64 {
    30
}
fn default_cache_size() -> u32 {
    64_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            backup_dir: default_backup_dir(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            busy_timeout_secs: default_busy_timeout(),
            cache_size_kib: default_cache_size(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("fdtsdb")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".fdtsdb")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fdtsdb.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("fdtsdb.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    /// Fields missing from the file take their defaults.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir())?;
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        let mut file = fs::File::create(Self::config_file())?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Initialize the configuration file from `base` and return the result.
    /// A relative database name is placed inside the config directory.
    pub fn init_all(base: Config, write_file: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db = expand_tilde(&base.database);
        let database = if db.is_absolute() { db } else { dir.join(db) };

        let config = Config {
            database: database.to_string_lossy().to_string(),
            ..base
        };

        if write_file {
            config.save()?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        Ok(config)
    }

    /// Engine-facing settings for `DatabaseManager`.
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            max_connections: self.max_connections,
            acquire_timeout: self.acquire_timeout_secs.map(Duration::from_secs),
            busy_timeout: Duration::from_secs(self.busy_timeout_secs),
            cache_size_kib: self.cache_size_kib,
            ..DbConfig::new(expand_tilde(&self.database), expand_tilde(&self.backup_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_takes_defaults() {
        let cfg = Config::from_yaml("database: /data/fdts.sqlite\nmax_connections: 4\n").unwrap();
        assert_eq!(cfg.database, "/data/fdts.sqlite");
        assert_eq!(cfg.max_connections, 4);
        assert_eq!(cfg.acquire_timeout_secs, Some(30));
        assert_eq!(cfg.busy_timeout_secs, 30);
        assert_eq!(cfg.cache_size_kib, 64_000);
    }

    #[test]
    fn null_acquire_timeout_waits_forever() {
        let cfg = Config::from_yaml("acquire_timeout_secs: null\n").unwrap();
        assert_eq!(cfg.db_config().acquire_timeout, None);
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = Config::from_yaml("max_connections: [oops").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn db_config_maps_every_field() {
        let cfg = Config {
            database: "/srv/fdts/db.sqlite".into(),
            backup_dir: "/srv/fdts/backups".into(),
            max_connections: 3,
            acquire_timeout_secs: Some(5),
            busy_timeout_secs: 7,
            cache_size_kib: 1024,
        };
        let db = cfg.db_config();
        assert_eq!(db.database, PathBuf::from("/srv/fdts/db.sqlite"));
        assert_eq!(db.backup_dir, PathBuf::from("/srv/fdts/backups"));
        assert_eq!(db.max_connections, 3);
        assert_eq!(db.acquire_timeout, Some(Duration::from_secs(5)));
        assert_eq!(db.busy_timeout, Duration::from_secs(7));
        assert_eq!(db.cache_size_kib, 1024);
    }
}
