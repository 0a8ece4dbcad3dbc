//! Logging and tracing setup
//!
//! Console output goes to stderr so it never mixes with rendered tables.
//! JSON logs to daily rolling files are opt-in. `RUST_LOG` overrides the
//! configured filter.

use std::path::PathBuf;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::settings::LoggingSettings;

const LOG_FILE_PREFIX: &str = "simple-crud.log";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Where JSON log files go
    pub log_dir: PathBuf,
    pub json_logs: bool,
    /// File and line in console output
    pub include_location: bool,
    /// Log span creation and close, useful to time facade calls
    pub span_events: bool,
    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl LoggingConfig {
    /// Verbose console output for the crud crates
    pub fn development() -> Self {
        Self {
            log_dir: log_directory(),
            json_logs: false,
            include_location: true,
            span_events: false,
            filter: "warn,simple_crud_app=debug,simple_crud_services=debug,simple_crud_core=debug,simple_crud_driver_sqlite=debug".to_string(),
        }
    }

    /// Quiet console, JSON logs kept for bug reports
    pub fn production() -> Self {
        Self {
            log_dir: log_directory(),
            json_logs: true,
            include_location: false,
            span_events: false,
            filter: "warn".to_string(),
        }
    }

    /// Everything on the console, no files
    #[cfg(test)]
    pub fn testing() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("simple-crud-tests"),
            json_logs: false,
            include_location: true,
            span_events: true,
            filter: "debug".to_string(),
        }
    }

    /// Preset for the build profile, adjusted by the settings file
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        let mut config = if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        };
        config.json_logs |= settings.json_logs;
        if let Some(filter) = &settings.filter {
            config.filter = filter.clone();
        }
        config
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the JSON file writer when dropped; hold it
/// until the process is about to exit.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let (subscriber, guard) = build(&config)?;
    subscriber.try_init()?;

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        json_logs = config.json_logs,
        "logging initialized"
    );
    Ok(guard)
}

/// Assemble the subscriber without installing it
pub fn build(
    config: &LoggingConfig,
) -> anyhow::Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
    // NEW rather than ENTER: async spans are re-entered on every poll
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events.clone())
        .compact()
        .with_filter(config.env_filter());

    let (json, guard) = if config.json_logs {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(config.env_filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let subscriber = tracing_subscriber::registry().with(console).with(json);
    Ok((subscriber, guard))
}

pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("simple-crud")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_keeps_json_logs() {
        let config = LoggingConfig::production();
        assert!(config.json_logs);
        assert!(!config.include_location);
    }

    #[test]
    fn development_is_console_only() {
        let config = LoggingConfig::development();
        assert!(!config.json_logs);
        assert!(config.filter.contains("simple_crud_services=debug"));
    }

    #[test]
    fn testing_writes_no_files() {
        let config = LoggingConfig::testing();
        assert!(!config.json_logs);
        assert_eq!(config.filter, "debug");
    }

    #[test]
    fn json_logs_are_flushed_when_the_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().to_path_buf(),
            json_logs: true,
            filter: "info".to_string(),
            ..LoggingConfig::testing()
        };

        let (subscriber, guard) = build(&config).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(list = "groceries", "delete refused");
        });
        drop(guard.expect("JSON logging keeps a writer guard"));

        let written: String = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
            })
            .map(|path| std::fs::read_to_string(path).unwrap())
            .collect();
        assert!(written.contains("delete refused"), "log was: {written:?}");
        assert!(written.contains("\"list\":\"groceries\""), "log was: {written:?}");
    }

    #[test]
    fn console_only_config_has_no_guard() {
        let (_subscriber, guard) = build(&LoggingConfig::testing()).unwrap();
        assert!(guard.is_none());
    }

    #[test]
    fn settings_override_filter_and_enable_json() {
        let settings = LoggingSettings {
            json_logs: true,
            filter: Some("trace".into()),
        };
        let config = LoggingConfig::from_settings(&settings);
        assert!(config.json_logs);
        assert_eq!(config.filter, "trace");
    }
}
