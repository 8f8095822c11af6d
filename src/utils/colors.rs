/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const GREEN: &str = "\x1b[32m";

/// Grey for the NULL sentinel, plain text otherwise.
pub fn colorize_field(value: &str) -> String {
    if value == crate::db::rows::NULL_TEXT {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
