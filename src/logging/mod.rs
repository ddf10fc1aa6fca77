//! Logging setup
//!
//! The library only emits `tracing` events; binaries decide where they go.
//! [`init`] installs a stderr subscriber honoring `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "container_registry_client=debug,crctl=debug"
    } else {
        "container_registry_client=warn,crctl=info"
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug() {
        assert!(default_directives(true).contains("debug"));
        assert!(!default_directives(false).contains("debug"));
    }

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
