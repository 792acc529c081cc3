//! Human and JSON rendering of command results.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter for the global `--json`, `--debug` and `--quiet` flags.
/// Debug mode also lists every packed entry.
pub fn create_formatter(json: bool, debug: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        return Box::new(JsonFormatter);
    }
    Box::new(HumanFormatter::new(debug, quiet))
}
