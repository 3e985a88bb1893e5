//! Error handling for the Bobun CLI.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Every variant aims to be actionable: messages end with a `Hint:` line that
//! tells the user what to change.
//!
//! # Architecture
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ManifestError`, `BuildError`, `ConfigError`)
//!   carry detailed context
//! - **Error conversion** is automatic via `#[from]` attributes
//! - **Context helpers** (`ResultExt`) attach paths or hints to any error
//!
//! # Example
//!
//! ```rust,no_run
//! use bobun::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_source(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Entry sources live under src/")
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// package.json could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Unsupported targets or failed entries
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Layered configuration could not be assembled
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Errors raised while loading `package.json`.
///
/// All of them are fatal: no partial manifest is usable, and the run stops
/// before the output directory is touched.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No package.json in the working directory
    #[error("package.json not found: {}\n\nHint: Run bobun from the package root", .0.display())]
    NotFound(PathBuf),

    /// package.json exists but is not valid JSON
    #[error("Invalid JSON in {}: {source}\n\nHint: Use a JSON validator to check syntax", .path.display())]
    InvalidJson {
        /// Manifest that failed to parse
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: serde_json::Error,
    },

    /// package.json parsed but its top level is not an object
    #[error("{} must contain a JSON object\n\nHint: A manifest starts with '{{' and ends with '}}'", .0.display())]
    NotAnObject(PathBuf),

    /// Any other read failure
    #[error("Failed to read package.json: {0}")]
    Io(#[from] std::io::Error),
}

/// Build process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Target path has a CommonJS extension
    #[error("CommonJS is not supported yet: {0}\n\nHint: Point the manifest field at an .mjs or .js output instead")]
    UnsupportedFormat(String),

    /// At least one entry failed to build
    #[error("{failed} of {total} entries failed to build\n\nHint: See the diagnostics printed above for each failed entry")]
    Failed {
        /// Number of failed entries
        failed: usize,
        /// Number of dispatched entries
        total: usize,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into `CliError::FileNotFound(path)`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

/// Convert a `CliError` into a miette report for terminal display.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Manifest(e) => miette::miette!("{}", e),
        CliError::Build(e) => miette::miette!("{}", e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        other => miette::miette!("{}", other),
    }
}
