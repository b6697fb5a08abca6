//! Utilities for logging.
use std::sync::Once;

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<u8> for Verbosity {
    fn from(value: u8) -> Self {
        match value {
            0 => Verbosity::Info,
            1 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }
}

impl From<Verbosity> for Level {
    fn from(value: Verbosity) -> Self {
        match value {
            Verbosity::Info => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Trace => Level::TRACE,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    #[default]
    Full,
    Compact,
    Json,
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

/// Install the global subscriber.
///
/// `RUST_LOG` directives take precedence over the verbosity passed in.
pub fn init(verbosity: impl Into<Verbosity>, mode: LoggingMode) -> Result<(), SetGlobalDefaultError> {
    let level: Level = verbosity.into().into();
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(level))
        .with_file(true)
        .with_line_number(true);

    match mode {
        LoggingMode::Full => tracing::subscriber::set_global_default(builder.finish()),
        LoggingMode::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
        LoggingMode::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
}

static TEST_INIT: Once = Once::new();

/// Initialize logging for tests.
///
/// Safe to call from every test, only the first call installs a subscriber.
/// Output goes through the test writer so it's captured per test.
pub fn init_test() {
    TEST_INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_test_writer()
            .with_env_filter(env_filter(Level::DEBUG))
            .with_file(true)
            .with_line_number(true)
            .finish();
        // Another harness may have installed one already.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
