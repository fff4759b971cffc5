//! Diagnostic logging
//!
//! Scanner and resolver details go through `tracing`. Nothing is shown by
//! default except warnings; `--verbose` turns on debug output for this crate
//! and `RUST_LOG` replaces the filter entirely.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "dpdm=warn";
const VERBOSE_FILTER: &str = "dpdm=debug";
const QUIET_FILTER: &str = "dpdm=error";

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    }
}

/// Install the global subscriber writing to stderr
///
/// Calling this more than once keeps the first subscriber.
pub fn init_logger(verbose: bool, quiet: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(console::colors_enabled_stderr())
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .try_init();
}
