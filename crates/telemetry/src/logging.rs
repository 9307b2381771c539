use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{env, io, path::PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable format (default for interactive runs)
    #[default]
    Pretty,
    /// Single-line text, suited to cron mail
    Compact,
    /// JSON format for log aggregation systems
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }

    /// Reads `LOG_FORMAT`; unknown or missing values fall back to pretty.
    pub fn from_env() -> Self {
        Self::parse(&env::var("LOG_FORMAT").unwrap_or_default())
    }
}

/// Configuration for structured logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Binary name, also used as the log file prefix
    pub service_name: String,
    pub service_version: String,
    /// When set, a daily rolling JSON log is written here as well
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            format: LogFormat::from_env(),
            service_name: service_name.into(),
            service_version: env::var("SERVICE_VERSION").unwrap_or_else(|_| "0.1.0".to_string()),
            log_dir: env::var("LOG_DIR").ok().filter(|d| !d.is_empty()).map(PathBuf::from),
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_file_logging(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    fn log_file_prefix(&self) -> String {
        format!("{}.log", self.service_name)
    }
}

fn stdout_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_line_number(true)
            .with_writer(io::stdout)
            .boxed(),
    }
}

/// Initialize structured logging with the given configuration.
///
/// The returned guard flushes the file appender on drop and must be held
/// until the process exits.
pub fn init_structured_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    let mut layers = vec![stdout_layer(config.format)];

    let guard = match &config.log_dir {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, config.log_file_prefix());
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    tracing::info!(
        service.name = %config.service_name,
        service.version = %config.service_version,
        format = ?config.format,
        log_dir = ?config.log_dir,
        "structured logging initialized"
    );

    Ok(guard)
}
