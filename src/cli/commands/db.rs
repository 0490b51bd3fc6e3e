use crate::cli::commands::open_manager;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::write_log;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{error, step, success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        checkpoint,
        info,
        health,
    } = cmd
    {
        let manager = open_manager(cfg)?;

        //
        // 1) MIGRATE
        //
        if *migrate {
            step("Running migrations…");
            let applied = manager.migrate()?;
            success(format!("Migration completed ({} applied).", applied));
        }

        //
        // 2) INFO
        //
        if *info {
            stats::print_db_info(&manager)?;
        }

        //
        // 3) CHECK
        //
        if *check {
            step("Running integrity check…");
            let report = manager.integrity_check()?;
            if report.len() == 1 && report[0] == "ok" {
                success("Integrity check passed.");
            } else {
                error(format!("Integrity check failed: {}", report.join("; ")));
            }
        }

        //
        // 4) VACUUM
        //
        if *vacuum {
            step("Running VACUUM…");
            manager.vacuum()?;
            if let Err(e) = manager.with_main_connection(|conn| {
                write_log(conn, "vacuum", "", "Database vacuumed")
            }) {
                warning(format!("Failed to write internal log: {}", e));
            }
            success("Vacuum completed.");
        }

        //
        // 5) CHECKPOINT
        //
        if *checkpoint {
            step("Checkpointing WAL…");
            let res = manager.checkpoint()?;
            if res.busy {
                warning("Checkpoint could not complete: database busy.");
            } else {
                success(format!(
                    "Checkpoint completed ({} of {} frames).",
                    res.checkpointed_frames, res.log_frames
                ));
            }
        }

        //
        // 6) HEALTH
        //
        if *health {
            if manager.health_check() {
                success("Database is healthy.");
            } else {
                error("Health check failed.");
            }
        }

        manager.close();
    }

    Ok(())
}
