//! One-line status messages printed by the commands.

use ansi_term::Colour::{Blue, Green, Red, Yellow};
use ansi_term::Style;
use std::fmt;

fn tag(style: Style, icon: &str) -> String {
    style.bold().paint(icon).to_string()
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Blue.normal(), "ℹ️"), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Green.normal(), "✅"), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Yellow.normal(), "⚠️"), msg);
}

/// Errors go to stderr so scripted callers can still parse stdout.
pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", tag(Red.normal(), "❌"), msg);
}
