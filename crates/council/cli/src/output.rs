//! Output formatting utilities

use colored::*;

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print an indented key/value detail line
pub fn print_detail(key: &str, value: impl std::fmt::Display) {
    eprintln!("  {}: {}", key.dimmed(), value);
}
