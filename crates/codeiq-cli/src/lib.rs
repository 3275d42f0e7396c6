//! codeiq-cli library
//!
//! This module exposes the internal functionality of codeiq-cli for testing purposes.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Make commands module available for internal tests only
#[doc(hidden)]
pub mod commands;

pub use commands::types::{Neo4jArgs, ScanArgs, StoreKind};

/// Default filter directive for the verbosity flag
#[must_use]
pub const fn log_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the default level
pub fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests;
