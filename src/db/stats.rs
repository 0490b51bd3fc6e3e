use crate::db::manager::DatabaseManager;
use crate::db::pragmas::read_pragmas;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use serde::Serialize;

/// Pool counters plus engine page accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DbStats {
    pub active_connections: usize,
    pub pool_size: usize,
    /// Always `page_count * page_size`.
    pub database_size: i64,
    pub page_count: i64,
    pub page_size: i64,
}

pub fn print_db_info(manager: &DatabaseManager) -> AppResult<()> {
    let stats = manager.get_stats()?;
    let config = manager.config();
    let size_mb = (stats.database_size as f64) / (1024.0 * 1024.0);

    println!();
    println!(
        "{}• File:{} {}{}{}",
        CYAN,
        RESET,
        YELLOW,
        config.database.display(),
        RESET
    );
    println!(
        "{}• Size:{} {:.2} MB ({} pages × {} bytes)",
        CYAN, RESET, size_mb, stats.page_count, stats.page_size
    );
    println!(
        "{}• Connections:{} {}{}{} open, {} idle, max {}",
        CYAN,
        RESET,
        GREEN,
        stats.active_connections,
        RESET,
        stats.pool_size,
        config.max_connections
    );

    let pragmas = manager.with_main_connection(|conn| Ok(read_pragmas(conn)?))?;
    println!("{}• Engine:{}", CYAN, RESET);
    println!("    journal_mode: {}", pragmas.journal_mode);
    println!("    foreign_keys: {}", pragmas.foreign_keys);
    println!("    synchronous:  {}", pragmas.synchronous);
    println!("    cache_size:   {}", pragmas.cache_size);
    println!("    temp_store:   {}", pragmas.temp_store);
    println!("    busy_timeout: {} ms", pragmas.busy_timeout_ms);

    let backup_dir = config.backup_dir.display().to_string();
    println!("{}• Backups:{} {}{}{}", CYAN, RESET, GREY, backup_dir, RESET);
    println!();
    Ok(())
}

pub fn print_stats(stats: &DbStats) {
    println!("{}active_connections:{} {}", CYAN, RESET, stats.active_connections);
    println!("{}pool_size:{}          {}", CYAN, RESET, stats.pool_size);
    println!("{}database_size:{}      {}", CYAN, RESET, stats.database_size);
    println!("{}page_count:{}         {}", CYAN, RESET, stats.page_count);
    println!("{}page_size:{}          {}", CYAN, RESET, stats.page_size);
}
