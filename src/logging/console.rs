//! Console sink
//!
//! Writes each entry to the error, warn or standard stream depending on its level.

use std::io::{self, Write};
use std::sync::Mutex;

use super::level::Level;
use super::sink::{FormattedEntry, Sink, SinkError};

/// Console stream an entry is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Error,
    Warn,
    Standard,
}

impl ConsoleStream {
    /// Pick the stream for an entry level
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Error => ConsoleStream::Error,
            Level::Warn => ConsoleStream::Warn,
            _ => ConsoleStream::Standard,
        }
    }
}

type Stream = Mutex<Box<dyn Write + Send>>;

pub struct ConsoleSink {
    level: Level,
    error: Stream,
    warn: Stream,
    standard: Stream,
}

impl ConsoleSink {
    /// Console sink on the process stdio: error and warn go to stderr
    pub fn stdio(level: Level) -> Self {
        Self::with_writers(
            level,
            Box::new(io::stderr()),
            Box::new(io::stderr()),
            Box::new(io::stdout()),
        )
    }

    /// Console sink on arbitrary writers
    pub fn with_writers(
        level: Level,
        error: Box<dyn Write + Send>,
        warn: Box<dyn Write + Send>,
        standard: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            level,
            error: Mutex::new(error),
            warn: Mutex::new(warn),
            standard: Mutex::new(standard),
        }
    }

    fn stream(&self, stream: ConsoleStream) -> &Stream {
        match stream {
            ConsoleStream::Error => &self.error,
            ConsoleStream::Warn => &self.warn,
            ConsoleStream::Standard => &self.standard,
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn level(&self) -> Option<Level> {
        Some(self.level)
    }

    fn write(&self, entry: &FormattedEntry) -> Result<(), SinkError> {
        let mut out = self
            .stream(ConsoleStream::for_level(entry.level))
            .lock()
            .map_err(|_| SinkError::Poisoned("console stream"))?;
        writeln!(out, "{}", entry.line)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer that keeps everything in memory for assertions
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn buffered_console(level: Level) -> (ConsoleSink, [SharedBuffer; 3]) {
        let buffers = [
            SharedBuffer::default(),
            SharedBuffer::default(),
            SharedBuffer::default(),
        ];
        let sink = ConsoleSink::with_writers(
            level,
            Box::new(buffers[0].clone()),
            Box::new(buffers[1].clone()),
            Box::new(buffers[2].clone()),
        );
        (sink, buffers)
    }

    fn formatted(level: Level, line: &str) -> FormattedEntry {
        FormattedEntry {
            level,
            line: line.to_string(),
        }
    }

    #[test]
    fn test_stream_for_level() {
        assert_eq!(ConsoleStream::for_level(Level::Error), ConsoleStream::Error);
        assert_eq!(ConsoleStream::for_level(Level::Warn), ConsoleStream::Warn);
        assert_eq!(ConsoleStream::for_level(Level::Info), ConsoleStream::Standard);
        assert_eq!(ConsoleStream::for_level(Level::Debug), ConsoleStream::Standard);
    }

    #[test]
    fn test_routes_by_level() {
        let (sink, [error, warn, standard]) = buffered_console(Level::Debug);

        sink.write(&formatted(Level::Error, "e")).unwrap();
        sink.write(&formatted(Level::Warn, "w")).unwrap();
        sink.write(&formatted(Level::Info, "i")).unwrap();
        sink.write(&formatted(Level::Debug, "d")).unwrap();

        assert_eq!(error.contents(), "e\n");
        assert_eq!(warn.contents(), "w\n");
        assert_eq!(standard.contents(), "i\nd\n");
    }

    #[test]
    fn test_reports_own_level() {
        let sink = ConsoleSink::stdio(Level::Error);
        assert_eq!(sink.level(), Some(Level::Error));
        assert_eq!(sink.name(), "console");
    }
}
