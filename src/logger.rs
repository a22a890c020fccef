use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{Log, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

// Stdout carries command output (reports, JSON, new posts), logs go to stderr
fn add_console_sink(builder: &mut LoggerBuilder) -> spdlog::Result<()> {
    let stderr = Arc::new(StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::All)
        .build()?);

    builder.sink(stderr);

    Ok(())
}

/// Installs the default logger.
///
/// Without a `[log]` section only warnings reach the console, `verbose` lowers that
/// to info. With a location, logs also go to a daily rotating file.
pub fn configure_logger(log: Option<&Log>, verbose: bool) -> spdlog::Result<()> {
    let mut builder = Logger::builder();

    let level = match log {
        Some(log) => {
            if let Some(ref location) = log.location {
                let daily_sink = Arc::new(RotatingFileSink::builder()
                    .base_path(location)
                    .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
                    .max_files(30)
                    .rotate_on_open(false)
                    .build()?);
                builder.sink(daily_sink);
            }
            if log.log_to_console || log.location.is_none() {
                add_console_sink(&mut builder)?;
            }
            log.level.into()
        }
        None => {
            add_console_sink(&mut builder)?;
            Level::Warn
        }
    };
    let level = match level {
        Level::Critical | Level::Error | Level::Warn if verbose => Level::Info,
        other => other,
    };

    let logger = Arc::new(builder.build()?);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    logger.set_level_filter(LevelFilter::MoreSevereEqual(level));

    spdlog::set_default_logger(logger);

    Ok(())
}
