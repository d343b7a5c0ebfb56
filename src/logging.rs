//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence when set, e.g.
//! `RUST_LOG=queue_model::sim=trace` prints every engine event. Otherwise the
//! level passed to [`init_logging`] applies to this crate only.
//!
//! Levels used by the crate:
//! - TRACE: each arrival, start, preemption and completion
//! - DEBUG: run limits and solver inputs
//! - INFO: run summaries
//! - WARN: runs cut off by a safety bound

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a stderr subscriber. Repeated calls are no-ops.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), level).into());

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .try_init();
}
