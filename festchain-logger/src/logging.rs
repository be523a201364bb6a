//! Logging set-up shared by the FestChain binaries.
//!
//! [`init`] installs a global `tracing` subscriber from a [`LogConfig`]. The configured
//! level can be refined at run time through `RUST_LOG`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::File, str::FromStr, sync::Arc};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

/// Logging configuration. Missing keys take their default.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct LogConfig {
    /// Log level, e.g., "info", "debug", "trace".
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Path to the log file, required if output is "file".
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}

impl LogConfig {
    /// The configured level; unrecognised names mean `INFO`.
    pub fn level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::INFO)
    }

    /// The filter for this config: `RUST_LOG` if set, otherwise the configured level.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level().as_str()))
    }
}

/// Installs the global subscriber described by `config`.
///
/// Fails if the log file cannot be created or a subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let subscriber = Registry::default().with(config.filter());

    let installed = match config.output {
        LogOutput::File => {
            let file_path = config
                .file_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Log output is 'file' but 'file_path' is not specified"))?;
            let log_file = Arc::new(
                File::create(file_path)
                    .with_context(|| format!("Failed to create log file '{file_path}'"))?,
            );

            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(log_file).with_ansi(false).json())
                    .try_init(),
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(log_file).with_ansi(false))
                    .try_init(),
            }
        }
        LogOutput::Stdout => match config.format {
            LogFormat::Json => subscriber
                .with(fmt::layer().with_writer(std::io::stdout).json())
                .try_init(),
            LogFormat::Plain => subscriber
                .with(fmt::layer().with_writer(std::io::stdout).pretty())
                .try_init(),
        },
    };
    installed.context("Failed to install the tracing subscriber")?;

    Ok(())
}
