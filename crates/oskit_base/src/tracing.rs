use crate::err;
use crate::error::OsResult;
pub use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber, honouring `RUST_LOG`.
pub fn init_tracing() -> OsResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Installs the global subscriber with an explicit filter directive such as `oskit=debug`.
pub fn init_tracing_with_filter(directive: &str) -> OsResult<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| err!("Invalid log filter '{}': {}", directive, e))?;
    install(filter)
}

fn install(filter: EnvFilter) -> OsResult<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| err!("Failed to install tracing subscriber: {}", e))
}
