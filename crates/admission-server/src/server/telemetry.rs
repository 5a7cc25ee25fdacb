//! Console logging for the server.
//!
//! Spans and events from this crate, `admission-sin` and `tower-http` are
//! printed through `tracing_subscriber::fmt`. Verbosity is controlled by
//! `RUST_LOG` and defaults to `info`.
//!
//! ```bash
//! RUST_LOG=debug,tower_http=trace cargo run -p admission-server
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(())
}
