//! Observability (logging)
//!
//! Structured logging for the CLI. Events go to stderr so they never mix
//! with report output on stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV: &str = "STOREFRONT_LOG";

/// Initialize the logging stack
///
/// Filter precedence: `STOREFRONT_LOG`, then `RUST_LOG`, then `debug` when
/// `verbose` is set and `warn` otherwise.
///
/// Calling this more than once is harmless; only the first call installs a
/// subscriber.
///
/// # Example
///
/// ```rust,no_run
/// use storefront::config::LogFormat;
/// use storefront::observability;
///
/// observability::init(LogFormat::Compact, false);
/// tracing::info!("storefront started");
/// ```
pub fn init(format: LogFormat, verbose: bool) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let registry = tracing_subscriber::registry().with(env_filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // try_init: a subscriber may already be installed (tests, embedding)
    let _ = match format {
        LogFormat::Compact => registry.with(fmt.compact()).try_init(),
        LogFormat::Pretty => registry.with(fmt.pretty()).try_init(),
        LogFormat::Json => registry.with(fmt.json()).try_init(),
    };
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,storefront=debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "warn,storefront=debug");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(LogFormat::Compact, false);
        init(LogFormat::Json, true);
    }
}
