pub mod api; // HTTP hosting surface
pub mod config;
pub mod pipeline;

#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

/// Initialize tracing once per process. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
