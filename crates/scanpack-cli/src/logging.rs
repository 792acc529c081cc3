//! Log subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directive used when `RUST_LOG` is not set.
fn default_directive(debug: bool, quiet: bool) -> &'static str {
    if debug {
        "scanpack=debug,scanpack_core=debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Installs a stderr fmt layer. `RUST_LOG` takes precedence over the flags.
pub fn init(debug: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug, quiet)));

    // A second initialisation only happens in tests; ignore it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug),
        )
        .try_init();
}
