use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` overrides `config.level`.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let log_file = open_log_file(config)?;
    install(config, log_file)
}

/// Like [`init_logging`], but logs to the console when the configured file
/// cannot be opened. The open error is handed back so it can be logged once
/// the subscriber is up.
pub fn init_logging_or_console(config: &LoggingConfig) -> Result<Option<anyhow::Error>> {
    match open_log_file(config) {
        Ok(log_file) => install(config, log_file).map(|()| None),
        Err(e) => install(config, None).map(|()| Some(e)),
    }
}

fn open_log_file(config: &LoggingConfig) -> Result<Option<Arc<File>>> {
    let Some(file_path) = &config.file_path else {
        return Ok(None);
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .with_context(|| format!("cannot open log file {}", file_path))?;

    Ok(Some(Arc::new(file)))
}

fn install(config: &LoggingConfig, log_file: Option<Arc<File>>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match (config.format.as_str(), log_file) {
        ("json", Some(file)) => registry
            .with(fmt::layer().json().with_writer(file))
            .try_init()?,
        ("json", None) => registry.with(fmt::layer().json()).try_init()?,
        (_, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(file))
            .try_init()?,
        (_, None) => registry.with(fmt::layer().with_target(false)).try_init()?,
    }

    tracing::debug!("Logging initialized with level: {}", config.level);
    Ok(())
}
