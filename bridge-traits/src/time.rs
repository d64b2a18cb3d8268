//! Clock and log forwarding
//!
//! "Recently added" and "last opened" are only as good as the time source
//! that stamped them, so the collection asks a [`Clock`] instead of calling
//! `Utc::now()`. Log lines take the opposite route: the core produces them
//! and a [`LoggerSink`] hands them to whatever the host uses for logs.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use crate::error::Result;

/// Source of the current time
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn stamp_opened(clock: &dyn Clock) -> String {
///     clock.now().format("%H:%M:%S - %d.%m.%Y").to_string()
/// }
/// ```
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `now()` without the zone, the form book timestamps are stored in
    fn naive_now(&self) -> NaiveDateTime {
        self.now().naive_utc()
    }

    /// Seconds since the Unix epoch
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall-clock time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
///
/// Books added through a collection wired to a `FixedClock` receive exactly
/// the timestamp the test chose, which keeps "recently added" ordering
/// deterministic.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Severity of a forwarded log line, least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(label)
    }
}

/// One log line as handed to a [`LoggerSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Emitting module, e.g. `core_library::view::proxy`
    pub target: String,
    pub message: String,
    /// Structured key/value pairs, already redacted by the emitter
    pub fields: BTreeMap<String, String>,
    /// Name of the innermost span the line was emitted in
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }
}

impl fmt::Display for LogEntry {
    /// `2024-03-09 07:05:30.000  INFO core_library::collection: Book added count=2`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>5} {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Destination for log lines produced by the core
///
/// The reader application decides where they go: a rotating file next to
/// the library database, the system journal, a debug console in the UI.
///
/// The core redacts e-mails, tokens and full file paths before a line gets
/// here, but sinks that ship logs off the machine should apply their own
/// policy on top.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::{LoggerSink, LogEntry, LogLevel};
///
/// async fn report(logger: &dyn LoggerSink, error: &str) {
///     let entry = LogEntry::new(LogLevel::Error, "core_library", error)
///         .with_field("component", "collection");
///     logger.log(entry).await.ok();
/// }
/// ```
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Lines below this level are dropped before they are built.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Writes one line per entry to stderr
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

#[async_trait::async_trait]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{}", entry);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let before = clock.unix_timestamp();
        assert!(before > 0);
        assert!(clock.now().timestamp() >= before);
    }

    #[test]
    fn test_fixed_clock() {
        let start = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.naive_now(), start.naive_utc());

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.unix_timestamp(), start.timestamp() + 300);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_log_level_ordering_and_display() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(format!("[{:>5}]", LogLevel::Info), "[ INFO]");
        assert_eq!(format!("[{:<5}]", LogLevel::Warn), "[WARN ]");
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn test_log_entry_display() {
        let mut entry = LogEntry::new(LogLevel::Info, "core_library::collection", "Book added")
            .with_field("file", "dune.epub")
            .with_field("count", "2")
            .with_span("add_book");
        entry.timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 30).unwrap();

        assert_eq!(
            entry.to_string(),
            "2024-03-09 07:05:30.000  INFO core_library::collection: Book added count=2 file=dune.epub"
        );
        assert_eq!(entry.span.as_deref(), Some("add_book"));
    }

    #[tokio::test]
    async fn test_console_logger_respects_min_level() {
        let logger = ConsoleLogger {
            min_level: LogLevel::Warn,
        };
        assert_eq!(logger.min_level(), LogLevel::Warn);

        logger
            .log(LogEntry::new(LogLevel::Debug, "core_runtime", "dropped"))
            .await
            .unwrap();
        logger.flush().await.unwrap();
    }
}
