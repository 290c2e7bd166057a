//! Tracing setup: JSON lines to a rotating log file plus a plain console layer.
//!
//! File placement, rotation limits and the fallback filter come from the
//! `logging` section of `config.json`. `RUST_LOG` still wins over the filter.

use anyhow::{Context, Result};
use linkrag_core::config::LoggingConfig;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop, so `main` holds it
/// for the life of the process.
pub fn init_telemetry(config: &LoggingConfig) -> Result<WorkerGuard> {
    let appender = open_log_file(config)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &config.filter)?;

    // Span close events carry request timings from TracingLogger
    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true);

    let console_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!(
        dir = %config.dir,
        file = %config.file_name,
        max_file_size_mb = config.max_file_size_mb,
        max_files = config.max_files,
        "Telemetry initialized"
    );

    Ok(guard)
}

/// Open the active log file, rolling daily or at the size cap
fn open_log_file(config: &LoggingConfig) -> Result<RollingFileAppender<RollingConditionBasic>> {
    let dir = Path::new(&config.dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let condition = RollingConditionBasic::new()
        .daily()
        .max_size(config.max_file_size_mb * BYTES_PER_MB);

    RollingFileAppender::new(dir.join(&config.file_name), condition, config.max_files)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

/// `RUST_LOG` when set and non-empty, otherwise the configured directive
fn build_filter(from_env: Option<String>, fallback: &str) -> Result<EnvFilter> {
    let directives = from_env
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter {:?}", directives))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_prefers_environment() {
        let filter = build_filter(Some("warn".to_string()), "linkrag_core=debug").unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_blank_environment_falls_back() {
        let filter = build_filter(Some("  ".to_string()), "linkrag_core=debug").unwrap();
        assert_eq!(filter.to_string(), "linkrag_core=debug");
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        assert!(build_filter(None, "linkrag_core=loud").is_err());
    }

    #[test]
    fn test_log_file_created_in_configured_dir() {
        let dir = std::env::temp_dir().join(format!("linkrag-telemetry-{}", std::process::id()));
        let config = LoggingConfig {
            dir: dir.to_string_lossy().into_owned(),
            file_name: "test.log".to_string(),
            ..LoggingConfig::default()
        };

        let _appender = open_log_file(&config).unwrap();
        assert!(dir.join("test.log").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
