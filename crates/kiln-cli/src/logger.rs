//! Logging setup.
//!
//! The libraries only emit `tracing` events; the binary decides what is
//! shown. Precedence: `--verbose`, then `--quiet`, then `RUST_LOG`, then the
//! default of `info` for the kiln crates.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE: &str = "kiln=debug,kiln_cli=debug,kiln_compiler=debug,kiln_config=debug,kiln_graph=debug,kiln_gen=debug";
const QUIET: &str = "error";
const DEFAULT: &str = "kiln=info,kiln_cli=info,kiln_compiler=info,kiln_config=info";

/// Pick the filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE)
    } else if quiet {
        EnvFilter::new(QUIET)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Colors unless `NO_COLOR` is set; `FORCE_COLOR` wins over terminal detection.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
