//! fdtsdb main entrypoint.

use fdtsdb::run;
use fdtsdb::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
