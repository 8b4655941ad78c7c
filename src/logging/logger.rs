//! The logger handed to the rest of the application
//!
//! Every call is checked against the logger threshold once, rendered once, then
//! written synchronously to each sink whose own threshold accepts it. Sink
//! failures are swallowed. Each successful write is acknowledged on a broadcast
//! channel that subscribers drain whenever they like.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::broadcast;

use super::entry::{Fields, LogEntry};
use super::format::{apply_splat, format_entry};
use super::level::Level;
use super::sink::{FormattedEntry, Sink};

/// Capacity of the acknowledgment channel
const ACK_CAPACITY: usize = 256;

/// Acknowledgment that a sink wrote an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logged {
    pub sink: String,
    pub level: Level,
    pub line: String,
}

struct LoggerInner {
    level: Level,
    sinks: Vec<Arc<dyn Sink>>,
    profilers: Mutex<HashMap<String, Instant>>,
    acks: broadcast::Sender<Logged>,
}

/// Cheap-to-clone logging handle
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    pub fn new(level: Level, sinks: Vec<Arc<dyn Sink>>) -> Self {
        let (acks, _) = broadcast::channel(ACK_CAPACITY);
        Self {
            inner: Arc::new(LoggerInner {
                level,
                sinks,
                profilers: Mutex::new(HashMap::new()),
                acks,
            }),
        }
    }

    /// The logger's threshold
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// Names of the active sinks, in write order
    pub fn sink_names(&self) -> Vec<String> {
        self.inner
            .sinks
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Receive an acknowledgment for every successful sink write from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Logged> {
        self.inner.acks.subscribe()
    }

    pub fn error(&self, message: &str, args: &[Value]) {
        self.log(Level::Error, message, args);
    }

    pub fn warn(&self, message: &str, args: &[Value]) {
        self.log(Level::Warn, message, args);
    }

    pub fn info(&self, message: &str, args: &[Value]) {
        self.log(Level::Info, message, args);
    }

    pub fn debug(&self, message: &str, args: &[Value]) {
        self.log(Level::Debug, message, args);
    }

    /// Log a message, applying `args` to its format tokens and extra fields
    pub fn log(&self, level: Level, message: &str, args: &[Value]) {
        if !level.passes(self.inner.level) {
            return;
        }
        let mut entry = LogEntry::new(level, message);
        apply_splat(&mut entry, args);
        self.dispatch(&entry);
    }

    /// Log a prepared entry
    pub fn log_entry(&self, entry: LogEntry) {
        if entry.level.passes(self.inner.level) {
            self.dispatch(&entry);
        }
    }

    fn dispatch(&self, entry: &LogEntry) {
        let formatted = FormattedEntry {
            level: entry.level,
            line: format_entry(entry),
        };

        for sink in &self.inner.sinks {
            if !sink.accepts(entry.level, self.inner.level) {
                continue;
            }
            if sink.write(&formatted).is_ok() {
                // No subscribers is fine
                let _ = self.inner.acks.send(Logged {
                    sink: sink.name().to_string(),
                    level: formatted.level,
                    line: formatted.line.clone(),
                });
            }
        }
    }

    /// Start or finish a named profile
    ///
    /// The first call for `name` starts it; the second emits an `info` entry
    /// with message `name` and its `durationMs`.
    pub fn profile(&self, name: &str) {
        let started = match self.inner.profilers.lock() {
            Ok(mut profilers) => match profilers.remove(name) {
                Some(started) => started,
                None => {
                    profilers.insert(name.to_string(), Instant::now());
                    return;
                }
            },
            Err(_) => return,
        };

        let entry = LogEntry::new(Level::Info, name)
            .with_field("durationMs", millis(started.elapsed()));
        self.log_entry(entry);
    }

    /// Start a timer whose `done` emits one entry with the elapsed time
    pub fn start_timer(&self) -> Timer {
        Timer {
            logger: self.clone(),
            started: Instant::now(),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.inner.level)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Handle returned by [`Logger::start_timer`]
pub struct Timer {
    logger: Logger,
    started: Instant,
}

impl Timer {
    /// Time since the timer started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Emit one entry carrying `fields` plus `durationMs`
    ///
    /// The entry is logged at `info` unless `fields` holds a valid `level`.
    pub fn done(self, message: impl Into<String>, fields: Fields) {
        let level = fields
            .get("level")
            .and_then(Value::as_str)
            .and_then(|l| l.parse().ok())
            .unwrap_or(Level::Info);

        let mut entry = LogEntry::new(level, message);
        entry.merge_fields(&fields);
        entry.insert_field("durationMs", millis(self.elapsed()));
        self.logger.log_entry(entry);
    }
}
