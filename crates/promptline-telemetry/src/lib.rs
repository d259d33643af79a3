//! Logging for promptline
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a text
//! or JSON formatting layer.

use promptline_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging from configuration
///
/// The filter is taken from `RUST_LOG` when set, then from the configured
/// filter, then from `default_filter`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>, default_filter: &str) -> anyhow::Result<()> {
    let format = config.map(|c| c.format).unwrap_or_default();
    let filter = build_filter(config.and_then(|c| c.filter.as_deref()), default_filter);

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_writer(std::io::stderr);

            registry.with(fmt_layer).try_init()
        }
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(configured: Option<&str>, default_filter: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    configured
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(default_filter).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
