use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "office=info";

/// Install the global `tracing` subscriber.
///
/// Reads `.env` (if present) and the `RUST_LOG` filter, defaulting to
/// `office=info`. Calling this more than once is a no-op, and an already
/// installed subscriber (e.g. from a test harness) is left in place.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let _ = dotenvy::dotenv();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_err()
        {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}
