//! Command-line interface definition.
//!
//! Bobun has a single default command: build every entry point declared in
//! `./package.json`. Only `--minify` and `--sourcemap` change what gets
//! built; the remaining flags control terminal output.


use clap::Parser;

/// Bobun - build a TypeScript library from its package.json with Bun
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "bobun",
    version,
    about = "Build your TypeScript library from the entry points in package.json.",
    long_about = "Bobun reads main, module, types, bin and exports from ./package.json,\n\
                  bundles each declared file from src/ into dist/ with Bun, keeps every\n\
                  dependency external and removes stale files from dist/."
)]
pub struct Cli {
    /// Minify the output
    #[arg(long)]
    pub minify: bool,

    /// Generate inline sourcemaps
    #[arg(long)]
    pub sourcemap: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Shows bundler command lines and pruned files.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
