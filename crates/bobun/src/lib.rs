//! Bobun - zero-config library builds driven by `package.json`.
//!
//! Bobun reads the output paths a package already declares (`main`, `module`,
//! `types`, `bin` and `exports`), works out the TypeScript source behind each
//! one, and asks Bun to build them all at once. Dependencies stay external,
//! executables get a shebang and anything left over in `dist/` from an
//! earlier layout is removed.
//!
//! # Architecture
//!
//! - [`manifest`] - lenient `package.json` reading
//! - [`entry`] - entry point discovery and path normalization
//! - [`build_config`] - per-entry build settings
//! - [`bundler`] - the [`Bundler`](bundler::Bundler) seam and the Bun implementation
//! - [`orchestrator`] - clean, build concurrently, finish outputs, prune
//! - [`prune`] - stale output removal
//! - [`report`] - user-facing status lines
//! - [`config`], [`cli`], [`logger`], [`ui`], [`error`] - the command-line shell
//!
//! # Example
//!
//! ```no_run
//! use bobun::{BobunConfig, BunBundler, Orchestrator, TerminalReporter};
//!
//! # async fn run() -> bobun::Result<()> {
//! let cwd = std::env::current_dir()?;
//! let config = BobunConfig::default();
//! let bundler = BunBundler::new(&cwd, config.bundler.clone());
//! let summary = Orchestrator::new(cwd, bundler, TerminalReporter, config)
//!     .run()
//!     .await?;
//! summary.into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod banner;
pub mod build_config;
pub mod bundler;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod logger;
pub mod manifest;
pub mod orchestrator;
pub mod prune;
pub mod report;
pub mod ui;

pub use bundler::{BunBundler, Bundler};
pub use config::BobunConfig;
pub use error::{BuildError, CliError, ConfigError, ManifestError, Result, ResultExt};
pub use orchestrator::{BuildSummary, Orchestrator};
pub use report::{MemoryReporter, Reporter, TerminalReporter};
