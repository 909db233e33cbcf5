//! Tracing subscriber setup.
//!
//! Log output goes to stdout through the `fmt` layer. Verbosity follows `RUST_LOG` and falls back
//! to `info`, e.g.:
//!
//! ```bash
//! export RUST_LOG="memberdesk=debug,tower_http=debug,sqlx=warn"
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
