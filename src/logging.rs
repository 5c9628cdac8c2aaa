//! Logging setup.
//!
//! The library only emits `tracing` events. Binaries and demos call [`init`]
//! to install a formatting subscriber; `RUST_LOG` overrides the given filter.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// Returns false if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
