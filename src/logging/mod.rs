//! Structured logger built from a named configuration section.
//!
//! The section is deserialized into [`LoggerSettings`] and turned into a
//! `tracing` dispatcher owned by the [`Logger`] handle, so several loggers can
//! coexist without touching the global subscriber.
//!
//! ```toml
//! [Logging]
//! minimum_level = "information"
//! format = "compact"
//! writer = "stderr"
//! ```

use std::fmt;

use serde::Deserialize;
use tracing::{Dispatch, Level, Span};
use tracing_subscriber::fmt::MakeWriter;

use crate::settings::Settings;
use crate::Error;

/// Name of the section the default logger factory reads.
///
/// Registries that keep a `Serilog` section name it through
/// [`Registry::with_provider`](crate::Registry::with_provider).
pub const DEFAULT_SECTION: &str = "Logging";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogWriter {
    Stdout,
    #[default]
    Stderr,
}

/// Contents of the logger section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub minimum_level: String,
    pub format: LogFormat,
    pub writer: LogWriter,
    pub ansi: bool,
    pub with_target: bool,
    pub with_thread_names: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            minimum_level: "info".to_string(),
            format: LogFormat::default(),
            writer: LogWriter::default(),
            ansi: false,
            with_target: true,
            with_thread_names: false,
        }
    }
}

impl LoggerSettings {
    /// Reads the section named `section` from `settings`.
    pub fn from_settings(settings: &Settings, section: &str) -> Result<Self, Error> {
        settings
            .root()
            .section(section)?
            .ok_or_else(|| Error::MissingSection(section.to_string()))
    }

    /// `None` means logging is switched off.
    pub fn level(&self) -> Result<Option<Level>, Error> {
        parse_log_level(&self.minimum_level)
    }
}

/// Parses a level name; Serilog-style names are accepted as aliases.
pub fn parse_log_level(level: &str) -> Result<Option<Level>, Error> {
    match level.to_lowercase().as_str() {
        "trace" | "verbose" => Ok(Some(Level::TRACE)),
        "debug" => Ok(Some(Level::DEBUG)),
        "info" | "information" => Ok(Some(Level::INFO)),
        "warn" | "warning" => Ok(Some(Level::WARN)),
        "error" | "fatal" => Ok(Some(Level::ERROR)),
        "off" => Ok(None),
        _ => Err(Error::InvalidLogLevel(level.to_string())),
    }
}

/// Handle to a configured logger.
///
/// Cloning is cheap; clones share the underlying subscriber.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    span: Span,
    context: Vec<String>,
}

impl Logger {
    /// Builds the logger described by `section` of `settings`.
    ///
    /// Fails with [`Error::MissingSection`] when the section doesn't exist.
    pub fn from_settings(settings: &Settings, section: &str) -> Result<Self, Error> {
        Self::new(&LoggerSettings::from_settings(settings, section)?)
    }

    pub fn new(settings: &LoggerSettings) -> Result<Self, Error> {
        match settings.writer {
            LogWriter::Stdout => Self::with_writer(settings, std::io::stdout),
            LogWriter::Stderr => Self::with_writer(settings, std::io::stderr),
        }
    }

    /// Builds a logger that writes to `writer` instead of the configured sink.
    pub fn with_writer<W>(settings: &LoggerSettings, writer: W) -> Result<Self, Error>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let builder = tracing_subscriber::fmt()
            .with_max_level(settings.level()?)
            .with_ansi(settings.ansi)
            .with_target(settings.with_target)
            .with_thread_names(settings.with_thread_names)
            .with_writer(writer);

        let dispatch = match settings.format {
            LogFormat::Full => Dispatch::new(builder.finish()),
            LogFormat::Compact => Dispatch::new(builder.compact().finish()),
            LogFormat::Json => Dispatch::new(builder.json().finish()),
        };

        Ok(Self {
            dispatch,
            span: Span::none(),
            context: Vec::new(),
        })
    }

    /// Creates a child logger whose events carry `name` as their source.
    ///
    /// Contexts nest: a child of a child reports both names.
    pub fn for_context(&self, name: impl Into<String>) -> Logger {
        let name = name.into();
        // ERROR spans stay enabled under every level that emits anything.
        let span = tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::span!(parent: &self.span, Level::ERROR, "context", source = %name)
        });
        let mut context = self.context.clone();
        context.push(name);
        Logger {
            dispatch: self.dispatch.clone(),
            span,
            context,
        }
    }

    /// Context names from the outermost to this logger's own.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let _entered = self.span.enter();
            match level {
                Level::TRACE => tracing::trace!("{message}"),
                Level::DEBUG => tracing::debug!("{message}"),
                Level::INFO => tracing::info!("{message}"),
                Level::WARN => tracing::warn!("{message}"),
                _ => tracing::error!("{message}"),
            }
        });
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(Level::TRACE, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::ERROR, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
