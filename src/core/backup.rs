use crate::db::log::write_log;
use crate::db::manager::DatabaseManager;
use crate::errors::{AppError, AppResult};
use chrono::Local;
use rusqlite::params;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Write a consistent snapshot of the database and return its final path.
    ///
    /// `dest` defaults to a timestamped file in the backup directory; a
    /// relative `dest` is resolved against the backup directory. An existing
    /// destination is never overwritten.
    pub fn backup(
        manager: &DatabaseManager,
        dest: Option<&Path>,
        compress: bool,
    ) -> AppResult<PathBuf> {
        let backup_dir = &manager.config().backup_dir;
        let dest = match dest {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => backup_dir.join(p),
            None => backup_dir.join(default_file_name()),
        };

        if dest.exists() || (compress && dest.with_extension("zip").exists()) {
            return Err(AppError::Backup(format!(
                "destination already exists: {}",
                dest.display()
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        // VACUUM INTO reads through the WAL, unlike a plain file copy.
        let target = dest.to_string_lossy().to_string();
        manager.with_main_connection(|conn| {
            conn.execute("VACUUM INTO ?1", params![target])?;
            Ok(())
        })?;

        let final_path = if compress {
            let compressed = compress_backup(&dest)?;
            if let Err(e) = fs::remove_file(&dest) {
                warn!(error = %e, path = %dest.display(), "failed to remove uncompressed backup");
            }
            compressed
        } else {
            dest
        };

        info!(path = %final_path.display(), compress, "backup created");

        let message = if compress {
            "Backup created and compressed"
        } else {
            "Backup created"
        };
        let logged = manager.with_main_connection(|conn| {
            write_log(conn, "backup", &final_path.to_string_lossy(), message)
        });
        if let Err(e) = logged {
            warn!(error = %e, "failed to record backup in log table");
        }

        Ok(final_path)
    }
}

fn default_file_name() -> String {
    format!("fdtsdb-{}.sqlite", Local::now().format("%Y%m%d-%H%M%S%.3f"))
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let entry_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Backup(format!("not a file path: {}", path.display())))?;

    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut f = fs::File::open(path)?;
    zip.start_file(entry_name, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(zip_path)
}
