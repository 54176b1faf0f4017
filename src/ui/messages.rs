//! User-facing console messages. Diagnostics go through `log` instead.

use crate::errors::AppError;
use crate::msg::FailureKind;
use ansi_term::{Colour, Style};
use std::fmt;

fn tag(colour: Colour, icon: &str) -> String {
    Style::new().bold().fg(colour).paint(icon).to_string()
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Colour::Blue, "ℹ️"), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Colour::Green, "✅"), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Colour::Yellow, "⚠️"), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", tag(Colour::Red, "❌"), msg);
}

pub fn header<T: fmt::Display>(msg: T) {
    println!("{}\n", Style::new().bold().fg(Colour::Blue).paint(msg.to_string()));
}

/// Report an error that ended a command.
pub fn report(err: &AppError) {
    if let AppError::Refused(msg) = err {
        warning(msg);
        return;
    }
    match FailureKind::from(err) {
        FailureKind::StorageUnavailable => {
            error(err);
            info("Run `timereaper init` first, or point --db at an existing database.");
        }
        FailureKind::NotImplemented => error(format!("{} (this is a bug)", err)),
        _ => error(err),
    }
}
