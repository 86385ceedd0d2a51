//! fieldclock main entrypoint.

use fieldclock::run;
use fieldclock::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
