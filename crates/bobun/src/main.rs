//! Bobun CLI entry point.
//!
//! Parses flags, sets up logging and colors, then builds the package in the
//! current directory.

use bobun::{BobunConfig, BunBundler, Orchestrator, TerminalReporter, cli, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    run(&args).await.map_err(error::cli_error_to_miette)
}

async fn run(args: &cli::Cli) -> bobun::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = BobunConfig::load(args)?;
    let bundler = BunBundler::new(&cwd, config.bundler.clone());

    Orchestrator::new(cwd, bundler, TerminalReporter, config)
        .run()
        .await?
        .into_result()?;
    Ok(())
}
