use crate::db::log::read_log;
use crate::db::manager::DatabaseManager;
use crate::errors::AppResult;
use crate::utils::colors::{GREY, RESET, color_for_operation};

const MAX_OP_WIDTH: usize = 60;

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(manager: &DatabaseManager) -> AppResult<()> {
        let entries = manager.with_main_connection(read_log)?;

        if entries.is_empty() {
            println!("{GREY}(internal log is empty){RESET}");
            return Ok(());
        }

        let rows: Vec<(i64, String, String, String, String)> = entries
            .into_iter()
            .map(|e| {
                let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or(e.date);

                // single column op+target, truncated without breaking chars
                let mut op_target = if e.target.is_empty() {
                    e.operation.clone()
                } else {
                    format!("{} ({})", e.operation, e.target)
                };
                if op_target.chars().count() > MAX_OP_WIDTH {
                    op_target = op_target.chars().take(MAX_OP_WIDTH - 3).collect();
                    op_target.push_str("...");
                }

                (e.id, date, e.operation, op_target, e.message)
            })
            .collect();

        let id_w = rows.iter().map(|r| r.0.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(10);
        let op_w = rows
            .iter()
            .map(|r| r.3.chars().count())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, operation, op_target, message) in rows {
            // only the operation word is colored; pad on visible width
            let (head, rest) = match op_target.strip_prefix(operation.as_str()) {
                Some(rest) => (operation.as_str(), rest),
                None => (op_target.as_str(), ""),
            };
            let padding = " ".repeat(op_w.saturating_sub(op_target.chars().count()));
            let color = color_for_operation(&operation);

            println!(
                "{:>id_w$}: {:<date_w$} | {}{}{}{}{} => {}",
                id,
                date,
                color,
                head,
                RESET,
                rest,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
