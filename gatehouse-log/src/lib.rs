//! Gatehouse Logging
//!
//! Structured logging for the Gatehouse crates, controlled entirely through
//! environment variables so that deployments can raise verbosity without a
//! rebuild.
//!
//! # Usage
//!
//! ```rust
//! use gatehouse_log::{debug, event, info, Level};
//!
//! debug!("Resolving provider configuration");
//! info!("Configured providers: {}", 2);
//!
//! // Key/value fields end up in the JSON object, or as `key=value` pairs
//! // in the text formats.
//! let provider = "google";
//! event!(Level::Info, "dispatch forwarded", provider = provider, phase = "initiate");
//! ```
//!
//! # Environment Variables
//!
//! - `GATEHOUSE_DEBUG=1` - Enable debug logging
//! - `GATEHOUSE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `GATEHOUSE_LOG_FORMAT=json|pretty|compact` - Set output format (default `json`)
//! - `GATEHOUSE_LOG_COLOR=1|0` - Enable/disable colors in `pretty` output
//! - `GATEHOUSE_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::fmt::{self, Display, Write as _};
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Levels and formats
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables all output when used as the threshold.
    Off = 5,
}

impl Level {
    /// Upper-case level name as printed in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => self.as_str().magenta(),
            Level::Debug => self.as_str().blue(),
            Level::Info => self.as_str().green(),
            Level::Warn => self.as_str().yellow(),
            Level::Error => self.as_str().red().bold(),
            Level::Off => self.as_str().white(),
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Trace,
            log::Level::Debug => Level::Debug,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warn,
            log::Level::Error => Level::Error,
        }
    }
}

/// Returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level `{}`", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

/// Output layout of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human readable, optionally colored.
    Pretty,
    /// One short line per record.
    Compact,
    /// One JSON object per line.
    Json,
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Global configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Build the configuration from `GATEHOUSE_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("GATEHOUSE_DEBUG").unwrap_or(defaults.debug);

        let level = env::var("GATEHOUSE_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("GATEHOUSE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.format);

        let color = env_flag("GATEHOUSE_LOG_COLOR").unwrap_or_else(|| {
            env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        });

        Self {
            debug,
            level,
            format,
            color,
            timestamps: env_flag("GATEHOUSE_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
        }
    }
}

/// Force configuration loading. Logging initializes lazily otherwise.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The active configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the threshold at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode at runtime. Enabling it lowers the threshold to `Debug`.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

// ============================================================================
// Output
// ============================================================================

/// A key/value pair attached to a record.
pub type Field<'a> = (&'a str, &'a dyn Display);

/// Write a record without fields.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Write a record with structured fields.
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[Field<'_>]) {
    if !is_level_enabled(level) {
        return;
    }

    let config = config();
    let line = render(config, level, target, message, fields);
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

/// Render a record to a single line according to `config`.
pub fn render(
    config: &LogConfig,
    level: Level,
    target: &str,
    message: &str,
    fields: &[Field<'_>],
) -> String {
    match config.format {
        Format::Json => render_json(config, level, target, message, fields),
        Format::Pretty => render_pretty(config, level, target, message, fields),
        Format::Compact => render_compact(config, level, target, message, fields),
    }
}

fn append_fields(out: &mut String, fields: &[Field<'_>]) {
    for (key, value) in fields {
        let _ = write!(out, " {}={}", key, value);
    }
}

fn render_pretty(
    config: &LogConfig,
    level: Level,
    target: &str,
    message: &str,
    fields: &[Field<'_>],
) -> String {
    let mut out = String::new();
    if config.timestamps {
        let _ = write!(out, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    {
        if config.color {
            let _ = write!(out, "{:5} ", level.colored());
        } else {
            let _ = write!(out, "{:5} ", level.as_str());
        }
    }
    #[cfg(not(feature = "color"))]
    let _ = write!(out, "{:5} ", level.as_str());

    if !target.is_empty() {
        let _ = write!(out, "[{}] ", target);
    }
    out.push_str(message);
    append_fields(&mut out, fields);
    out
}

fn render_compact(
    config: &LogConfig,
    level: Level,
    target: &str,
    message: &str,
    fields: &[Field<'_>],
) -> String {
    let mut out = String::new();
    if config.timestamps {
        let _ = write!(out, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }
    let initial = level.as_str().chars().next().unwrap_or('?');
    let _ = write!(out, "{} ", initial);
    if !target.is_empty() {
        let _ = write!(out, "{}: ", target);
    }
    out.push_str(message);
    append_fields(&mut out, fields);
    out
}

#[cfg(feature = "json")]
fn render_json(
    config: &LogConfig,
    level: Level,
    target: &str,
    message: &str,
    fields: &[Field<'_>],
) -> String {
    use serde_json::{Map, Value};

    let mut entry = Map::new();
    if config.timestamps {
        entry.insert(
            "timestamp".into(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }
    entry.insert("level".into(), Value::String(level.as_str().into()));
    entry.insert("target".into(), Value::String(target.into()));
    entry.insert("message".into(), Value::String(message.into()));

    if !fields.is_empty() {
        let extra: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| ((*key).to_string(), Value::String(value.to_string())))
            .collect();
        entry.insert("fields".into(), Value::Object(extra));
    }

    Value::Object(entry).to_string()
}

#[cfg(not(feature = "json"))]
fn render_json(
    config: &LogConfig,
    level: Level,
    target: &str,
    message: &str,
    fields: &[Field<'_>],
) -> String {
    let mut out = String::from("{");
    if config.timestamps {
        let _ = write!(out, "\"timestamp\":\"{}\",", chrono::Utc::now().to_rfc3339());
    }
    let _ = write!(
        out,
        "\"level\":\"{}\",\"target\":\"{}\",\"message\":\"{}\"",
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
    if !fields.is_empty() {
        out.push_str(",\"fields\":{");
        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(
                out,
                "\"{}\":\"{}\"",
                escape_json(key),
                escape_json(&value.to_string())
            );
        }
        out.push('}');
    }
    out.push('}');
    out
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// `log` facade bridge
// ============================================================================

/// Routes records from the `log` facade through the Gatehouse formatter.
pub struct Logger;

static LOGGER: Logger = Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        is_level_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            let message = record.args().to_string();
            log_fields(record.level().into(), record.target(), &message, &[]);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install [`Logger`] as the global `log` backend.
pub fn install() -> Result<(), log::SetLoggerError> {
    init();
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

// ============================================================================
// Macros
// ============================================================================

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a debug message.
///
/// Emitted when `GATEHOUSE_DEBUG=1` or the level is `debug` or lower.
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a message with key/value fields.
///
/// ```rust
/// use gatehouse_log::{event, Level};
///
/// event!(Level::Warn, "provider rejected", provider = "myspace");
/// event!(target: "gatehouse::guard", Level::Debug, "forwarded", provider = "apple");
/// ```
#[macro_export]
macro_rules! event {
    (target: $target:expr, $level:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        if $crate::is_level_enabled($level) {
            $crate::log_fields(
                $level,
                $target,
                &$msg,
                &[$((stringify!($key), &$value as &dyn ::std::fmt::Display)),*],
            );
        }
    };
    ($level:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::event!(target: module_path!(), $level, $msg $(, $key = $value)*)
    };
}

// ============================================================================
// Tracing integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber honoring the Gatehouse level settings.

    use super::*;

    /// Build a subscriber whose default filter follows `GATEHOUSE_LOG_LEVEL`.
    /// `RUST_LOG` still wins when set.
    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        let config = config();
        let default = match config.level {
            Level::Off => "off".to_string(),
            level => level.as_str().to_ascii_lowercase(),
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config.color))
    }
}
