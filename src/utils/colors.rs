//! ANSI color helper utilities for terminal output.

use crate::models::session::SessionStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

pub fn color_for_status(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::ClockedIn => GREEN,
        SessionStatus::OnBreak => YELLOW,
        SessionStatus::ClockedOut => RESET,
    }
}

/// Grey out placeholders such as "--:--" or an empty field.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--:--" || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

pub fn colorize_approval(approved: bool) -> String {
    if approved {
        format!("{GREEN}yes{RESET}")
    } else {
        format!("{GREY}no{RESET}")
    }
}

pub fn colorize_status(status: SessionStatus) -> String {
    format!("{}{}{}", color_for_status(status), status.label(), RESET)
}

/// Red for a failing check, green otherwise.
pub fn colorize_check(ok: bool, text: &str) -> String {
    if ok {
        format!("{GREEN}{text}{RESET}")
    } else {
        format!("{RED}{text}{RESET}")
    }
}
