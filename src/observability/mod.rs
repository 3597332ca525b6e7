//! Observability and telemetry.
//!
//! Logs always go to stderr or a file: stdout carries the MCP protocol.
//! Metrics are emitted through the `metrics` facade and are recorded by
//! whatever recorder the embedding process installs.

mod request_context;

pub use request_context::{RequestContext, current_request_id, scope_request_context};

use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_VAR: &str = "CONFLUENCE_MCP_LOG";
/// Environment variable selecting the log format.
pub const LOG_FORMAT_VAR: &str = "CONFLUENCE_MCP_LOG_FORMAT";
/// Environment variable naming a log file.
pub const LOG_FILE_VAR: &str = "CONFLUENCE_MCP_LOG_FILE";

const DEFAULT_FILTER: &str = "confluence_mcp=info,warn";
const VERBOSE_FILTER: &str = "confluence_mcp=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
    /// Optional log file; stderr when unset.
    pub file: Option<PathBuf>,
}

/// Options for environment-based initialization.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Whether verbose output was requested via CLI.
    pub verbose: bool,
    /// Format override from the CLI.
    pub format: Option<LogFormat>,
    /// Log file override from the CLI.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from the process environment.
    #[must_use]
    pub fn from_env(options: &InitOptions) -> Self {
        Self::from_lookup(options, |name| std::env::var(name).ok())
    }

    /// Builds logging configuration from CLI options and a variable lookup.
    ///
    /// CLI options win over the environment. The filter comes from
    /// [`LOG_FILTER_VAR`], then `RUST_LOG`, then a default chosen by
    /// `verbose`.
    #[must_use]
    pub fn from_lookup<F>(options: &InitOptions, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let format = options
            .format
            .or_else(|| non_empty(LOG_FORMAT_VAR).and_then(|v| LogFormat::parse(&v)))
            .unwrap_or_default();

        let filter = non_empty(LOG_FILTER_VAR)
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| {
                if options.verbose {
                    VERBOSE_FILTER.to_string()
                } else {
                    DEFAULT_FILTER.to_string()
                }
            });

        let file = options
            .file
            .clone()
            .or_else(|| non_empty(LOG_FILE_VAR).map(PathBuf::from));

        Self {
            format,
            filter,
            file,
        }
    }
}

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Initializes logging using environment variables and CLI options.
///
/// # Errors
///
/// Returns an error if logging has already been initialized, the filter
/// directive is invalid, or the log file cannot be opened.
pub fn init_from_env(options: &InitOptions) -> Result<()> {
    init(&LoggingConfig::from_env(options))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if logging has already been initialized, the filter
/// directive is invalid, or the log file cannot be opened.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Err(Error::OperationFailed {
            operation: "observability_init".to_string(),
            cause: "observability already initialized".to_string(),
        });
    }

    let filter = EnvFilter::try_new(&config.filter).map_err(|e| Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: format!("invalid log filter '{}': {e}", config.filter),
    })?;

    match &config.file {
        Some(path) => install(config.format, open_log_file(path)?, false, filter)?,
        None => install(config.format, io::stderr, true, filter)?,
    }

    OBSERVABILITY_INIT
        .set(())
        .map_err(|()| Error::OperationFailed {
            operation: "observability_init".to_string(),
            cause: "failed to mark observability initialized".to_string(),
        })
}

fn install<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi)
                    .with_target(true),
            )
            .try_init(),
    };
    installed.map_err(init_error)
}

/// Thread-safe file writer for logging.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Opens a log file for appending.
fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_log_dir".to_string(),
            cause: e.to_string(),
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::OperationFailed {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {}", path.display(), e),
        })?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}

fn init_error(err: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: err.to_string(),
    }
}
