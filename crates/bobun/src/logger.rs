//! Logging infrastructure.
//!
//! Diagnostics go through `tracing`; the status lines users normally see are
//! printed by [`crate::report`]. The verbosity flags choose the filter:
//!
//! 1. `--verbose`: DEBUG for bobun
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG` if set
//! 4. INFO for bobun otherwise

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Call once, before any logging.
///
/// Calling it a second time is harmless: the first subscriber stays.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("bobun=debug")
    } else if quiet {
        EnvFilter::new("bobun=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bobun=info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter() {
        assert_eq!(filter_for(true, false).to_string().to_lowercase(), "bobun=debug");
    }

    #[test]
    fn test_quiet_filter() {
        assert_eq!(filter_for(false, true).to_string().to_lowercase(), "bobun=error");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
