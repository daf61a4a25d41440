//! Colored terminal output
//!
//! `colored` honours NO_COLOR and CLICOLOR_FORCE. JSON and tree renderings go
//! to stdout, everything else to stderr, so `navtree fmt > out.json` stays clean.

use std::fmt::Display;

use colored::Colorize;

/// Width the status labels of `action` are right-aligned to.
const LABEL_WIDTH: usize = 8;

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

pub fn success(msg: &(impl Display + ?Sized)) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Status line such as `   moved #3 -> root[0]`.
pub fn action(label: &str, msg: &(impl Display + ?Sized)) {
    eprintln!("{:>width$} {}", label.green().bold(), msg, width = LABEL_WIDTH);
}

/// Secondary line under an action, aligned with its message.
pub fn detail(msg: &(impl Display + ?Sized)) {
    eprintln!("{:width$} {}", "", msg, width = LABEL_WIDTH);
}

/// Uncolored payload on stdout.
pub fn data(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
