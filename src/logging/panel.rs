//! Editor panel sink

use std::sync::Arc;

use crate::host::{Disposable, OutputChannel};

use super::sink::{FormattedEntry, Sink, SinkError};

/// Writes each entry as one line into a host-owned output panel.
///
/// Has no threshold of its own; it shows whatever the logger lets through.
pub struct PanelSink {
    channel: Arc<dyn OutputChannel>,
}

impl PanelSink {
    pub fn new(channel: Arc<dyn OutputChannel>) -> Self {
        Self { channel }
    }
}

impl Sink for PanelSink {
    fn name(&self) -> &str {
        "panel"
    }

    fn write(&self, entry: &FormattedEntry) -> Result<(), SinkError> {
        self.channel.append_line(&entry.line)
    }
}

impl Disposable for PanelSink {
    fn dispose(&self) {
        self.channel.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryChannel;
    use crate::logging::level::Level;

    #[test]
    fn test_writes_lines_to_channel() {
        let channel = Arc::new(MemoryChannel::new("TypeScript Hero", 10));
        let sink = PanelSink::new(channel.clone());

        sink.write(&FormattedEntry {
            level: Level::Debug,
            line: "first".to_string(),
        })
        .unwrap();

        assert_eq!(channel.lines(), vec!["first"]);
        assert_eq!(sink.level(), None);
    }

    #[test]
    fn test_dispose_closes_channel() {
        let channel = Arc::new(MemoryChannel::new("panel", 10));
        let sink = PanelSink::new(channel.clone());
        sink.dispose();

        assert!(channel.is_disposed());
        let result = sink.write(&FormattedEntry {
            level: Level::Info,
            line: "late".to_string(),
        });
        assert!(result.is_err());
    }
}
