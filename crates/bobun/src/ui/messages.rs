//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::colors_enabled;

/// Print a plain line to stderr.
pub fn log(message: &str) {
    eprintln!("{message}");
}

/// Print a success message to stderr.
///
/// # Examples
///
/// ```no_run
/// use bobun::ui::success;
///
/// success("src/index.ts → dist/index.js");
/// ```
pub fn success(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✔".green().bold(), message);
    } else {
        eprintln!("✔ {message}");
    }
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {message}");
    }
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {message}");
    }
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✖".red().bold(), message.red());
    } else {
        eprintln!("✖ {message}");
    }
}
