//! # Logging Utilities
//!
//! `tracing` subscriber setup shared by the typebridge binaries.
//!
//! Console output goes to stderr so it never mixes with what the CLI prints
//! on stdout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typebridge_utils::init_logging;
//!
//! // Buffered file output is flushed when the guard drops
//! let _guard = init_logging().expect("Failed to initialize logging");
//! tracing::info!("loading debug info");
//! ```
//!
//! ## Environment
//!
//! - `RUST_LOG`: filter directives (e.g. `RUST_LOG=typebridge_core::dwarf=trace`)
//! - `TYPEBRIDGE_LOG_FORMAT`: `pretty` (default) or `json`
//! - `TYPEBRIDGE_LOG_FILE`: also write to this file, rotated daily

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "TYPEBRIDGE_LOG_FORMAT";
/// Environment variable naming an additional log file
pub const LOG_FILE_ENV: &str = "TYPEBRIDGE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Human-readable lines with ANSI colors on the console
    #[default]
    Pretty,
    /// One JSON object per event, including the span list
    Json,
}

impl LogFormat
{
    const NAMES: &'static [(&'static str, LogFormat)] = &[
        ("pretty", LogFormat::Pretty),
        ("text", LogFormat::Pretty),
        ("json", LogFormat::Json),
    ];
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        lookup(Self::NAMES, s).ok_or_else(|| LoggingError::InvalidFormat(format!("{s} (expected pretty or json)")))
    }
}

/// Verbosity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel
{
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel
{
    const NAMES: &'static [(&'static str, LogLevel)] = &[
        ("error", LogLevel::Error),
        ("warn", LogLevel::Warn),
        ("warning", LogLevel::Warn),
        ("info", LogLevel::Info),
        ("debug", LogLevel::Debug),
        ("trace", LogLevel::Trace),
    ];
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        lookup(Self::NAMES, s)
            .ok_or_else(|| LoggingError::InvalidLevel(format!("{s} (expected error, warn, info, debug or trace)")))
    }
}

fn lookup<T: Copy>(names: &[(&str, T)], s: &str) -> Option<T>
{
    let s = s.trim();
    names
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|(_, value)| *value)
}

/// Initialize console logging from the environment
///
/// Reads `RUST_LOG`, `TYPEBRIDGE_LOG_FORMAT` and `TYPEBRIDGE_LOG_FILE`. An
/// unparsable format falls back to pretty output. The returned guard is
/// `Some` when a log file is configured and must be held until exit.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file directory cannot be created.
pub fn init_logging() -> Result<Option<WorkerGuard>, LoggingError>
{
    let format = env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    init_console_logging(format, None)
}

/// Initialize console logging at a fixed level
///
/// The level replaces any `RUST_LOG` directives.
///
/// ## Example
///
/// ```rust,no_run
/// use typebridge_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Json).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<Option<WorkerGuard>, LoggingError>
{
    init_console_logging(format, Some(level))
}

/// Dated log file under `~/.typebridge`, or under `/tmp` without a home
///
/// ## Errors
///
/// Returns an error if `~/.typebridge` cannot be created.
pub fn default_log_file() -> Result<PathBuf, LoggingError>
{
    let file_name = format!("{}-typebridge.log", Utc::now().format("%Y-%m-%d"));
    let Some(home) = env::var_os("HOME") else {
        return Ok(env::temp_dir().join(file_name));
    };
    let dir = PathBuf::from(home).join(".typebridge");
    fs::create_dir_all(&dir)?;
    Ok(dir.join(file_name))
}

/// Initialize logging to a file only, leaving stdout and stderr untouched
///
/// `level` takes precedence over `RUST_LOG`; without either the level is
/// `INFO`. Returns the path written to and the guard of the writer thread;
/// events still buffered are lost unless the guard is dropped before exit.
///
/// ## Example
///
/// ```rust,no_run
/// use typebridge_utils::{LogLevel, init_file_logging};
///
/// let (path, _guard) = init_file_logging("/tmp/typebridge.log", Some(LogLevel::Trace))
///     .expect("Failed to initialize file logging");
/// println!("logging to {}", path.display());
/// ```
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the
/// parent directory cannot be created.
pub fn init_file_logging(
    path: impl AsRef<Path>,
    level: Option<LogLevel>,
) -> Result<(PathBuf, WorkerGuard), LoggingError>
{
    let path = path.as_ref().to_path_buf();
    let (writer, guard) = file_writer(&path, tracing_appender::rolling::never)?;
    install(vec![file_layer(LogFormat::Pretty, writer, build_filter(level))])?;
    Ok((path, guard))
}

fn init_console_logging(format: LogFormat, level: Option<LogLevel>) -> Result<Option<WorkerGuard>, LoggingError>
{
    let mut layers = vec![console_layer(format, build_filter(level))];
    let mut guard = None;

    if let Some(path) = env::var_os(LOG_FILE_ENV).map(PathBuf::from) {
        let (writer, file_guard) = file_writer(&path, tracing_appender::rolling::daily)?;
        layers.push(file_layer(format, writer, build_filter(level)));
        guard = Some(file_guard);
    }

    install(layers)?;
    Ok(guard)
}

/// Non-blocking writer appending to `path`, creating its directory
fn file_writer(
    path: &Path,
    appender: fn(PathBuf, PathBuf) -> RollingFileAppender,
) -> Result<(NonBlocking, WorkerGuard), LoggingError>
{
    let (directory, file_name) = split_log_path(path)?;
    fs::create_dir_all(&directory)?;
    Ok(tracing_appender::non_blocking(appender(directory, file_name)))
}

fn install(layers: Vec<BoxedLayer>) -> Result<(), LoggingError>
{
    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());
    match format {
        LogFormat::Pretty => layer.with_ansi(true).with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer<W>(format: LogFormat, writer: W, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false);
    match format {
        LogFormat::Pretty => layer.with_filter(filter).boxed(),
        LogFormat::Json => layer.json().with_span_list(true).with_filter(filter).boxed(),
    }
}

/// Explicit level, then `RUST_LOG`, then `INFO`
fn build_filter(level: Option<LogLevel>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(Level::from(level).to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError>
{
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.display().to_string()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Log path has no file name
    #[error("Invalid log file path: {0}")]
    InvalidPath(String),

    /// A global subscriber was already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    #[error("Log file error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_log_format()
    {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" text ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!(matches!("xml".parse::<LogFormat>(), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_log_level()
    {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!(LogLevel::Debug > LogLevel::Info);

        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid log level: verbose"));
    }

    #[test]
    fn test_split_log_path()
    {
        let (dir, file) = split_log_path(Path::new("/var/log/typebridge.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(file, PathBuf::from("typebridge.log"));

        let (dir, file) = split_log_path(Path::new("bare.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, PathBuf::from("bare.log"));

        assert!(matches!(split_log_path(Path::new("/")), Err(LoggingError::InvalidPath(_))));
    }

    #[test]
    fn test_file_writer_flushes_on_guard_drop()
    {
        use std::io::Write;

        let dir = env::temp_dir().join(format!("typebridge-log-{}", std::process::id()));
        let path = dir.join("nested").join("flush.log");
        let _ = fs::remove_dir_all(&dir);

        let (mut writer, guard) = file_writer(&path, tracing_appender::rolling::never).unwrap();
        writer.write_all(b"last line before exit\n").unwrap();
        drop(guard);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "last line before exit\n");
        fs::remove_dir_all(&dir).unwrap();
    }
}
