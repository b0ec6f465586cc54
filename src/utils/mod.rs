pub mod build_info;
pub mod paths;

use std::{io, sync::Once};

static TRACING_INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "psicosystem=info";

/// Initializes the global tracing subscriber. Output goes to stderr so it never
/// interleaves with the wizard screens on stdout; `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // A subscriber installed by an embedding application wins.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    });
}
