//! `sportmate` command line client.
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::{AppConfig, ConfigError};
pub use error::{AppError, AppResult};

use snafu::ResultExt;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigSnafu;

/// Effective config for this invocation: file and environment, then command line overrides.
pub fn load_config(cli: &Cli) -> AppResult<AppConfig> {
    let config = AppConfig::load_from(&cli.config_path()).context(ConfigSnafu)?;
    Ok(config.with_base_url(cli.base_url.as_deref()))
}

/// Logs go to stderr so command output on stdout stays clean.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
