use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Installs structured logging for the host application.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at `config.log_level`.
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(config: &Config) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(config)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

fn fallback_filter(config: &Config) -> EnvFilter {
    EnvFilter::new(format!(
        "{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        config.log_level
    ))
}
