//! Logging setup.
//!
//! Diagnostics go to stderr through `tracing`. Debug output is enabled by
//! setting the `DEBUG` environment variable, otherwise only warnings are
//! shown. `RUST_LOG` takes precedence over both when set.

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor `DEBUG` is set.
const DEFAULT_DIRECTIVE: &str = "warn";

/// Directive used when `DEBUG` is set.
const DEBUG_DIRECTIVE: &str = "debug";

/// Filter for the given `DEBUG` state, unless `RUST_LOG` overrides it.
fn filter(debug: bool) -> EnvFilter {
    let fallback = if debug {
        DEBUG_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(env::var_os("DEBUG").is_some()))
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
        tracing::debug!("Test debug message");
    }

    #[test]
    fn test_filter_builds() {
        // Only checks construction; the chosen level depends on RUST_LOG.
        let _ = filter(true);
        let _ = filter(false);
    }
}
