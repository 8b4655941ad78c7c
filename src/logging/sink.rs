//! Sink capability and sink errors

use std::io;

use thiserror::Error;

use super::level::Level;

/// The rendering of an entry handed to every sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEntry {
    pub level: Level,
    pub line: String,
}

/// Failure of a single sink write
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    #[error("output channel '{0}' has been disposed")]
    ChannelDisposed(String),
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

/// A destination for formatted entries
pub trait Sink: Send + Sync {
    /// Short name used in acknowledgments
    fn name(&self) -> &str;

    /// The sink's own threshold; `None` inherits the logger's
    fn level(&self) -> Option<Level> {
        None
    }

    /// Write one entry. Returns once the write has happened.
    fn write(&self, entry: &FormattedEntry) -> Result<(), SinkError>;

    /// Whether an entry that already passed `logger_level` is accepted here
    fn accepts(&self, level: Level, logger_level: Level) -> bool {
        level.passes(self.level().unwrap_or(logger_level))
    }
}


#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::sync::Mutex;

    /// Sink that remembers every entry it accepted
    pub(crate) struct RecordingSink {
        pub(crate) name: &'static str,
        pub(crate) level: Option<Level>,
        pub(crate) entries: Mutex<Vec<FormattedEntry>>,
        pub(crate) fail: bool,
    }

    impl RecordingSink {
        pub(crate) fn new(name: &'static str, level: Option<Level>) -> Self {
            Self {
                name,
                level,
                entries: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub(crate) fn failing(name: &'static str) -> Self {
            Self {
                fail: true,
                ..Self::new(name, None)
            }
        }

        pub(crate) fn lines(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.line.clone())
                .collect()
        }
    }

    impl Sink for RecordingSink {
        fn name(&self) -> &str {
            self.name
        }

        fn level(&self) -> Option<Level> {
            self.level
        }

        fn write(&self, entry: &FormattedEntry) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::ChannelDisposed(self.name.to_string()));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }
}
