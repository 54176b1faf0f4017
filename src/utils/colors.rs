/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";

/// Running slots are highlighted, finished ones printed as-is.
pub fn colorize_running(value: &str, running: bool) -> String {
    if running {
        format!("{GREEN}{value}{RESET}")
    } else {
        value.to_string()
    }
}

