//! In-memory output panels
//!
//! A thread-safe ring buffer of panel lines, suitable for rendering in a TUI or
//! for inspecting what an extension wrote to its panel.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::logging::SinkError;

use super::{Disposable, Host, OutputChannel};

/// Default number of lines a panel keeps
pub const DEFAULT_PANEL_CAPACITY: usize = 10_000;

/// Output panel backed by a bounded line buffer
pub struct MemoryChannel {
    name: String,
    lines: RwLock<VecDeque<String>>,
    /// Maximum lines to keep; oldest are dropped first
    max_lines: usize,
    disposed: AtomicBool,
}

impl MemoryChannel {
    pub fn new(name: impl Into<String>, max_lines: usize) -> Self {
        Self {
            name: name.into(),
            lines: RwLock::new(VecDeque::with_capacity(max_lines.min(1024))),
            max_lines,
            disposed: AtomicBool::new(false),
        }
    }

    /// Get all lines currently in the panel
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .read()
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of lines in the panel
    pub fn len(&self) -> usize {
        self.lines.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Disposable for MemoryChannel {
    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Ok(mut lines) = self.lines.write() {
            lines.clear();
        }
    }
}

impl OutputChannel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        if self.is_disposed() {
            return Err(SinkError::ChannelDisposed(self.name.clone()));
        }
        let mut lines = self
            .lines
            .write()
            .map_err(|_| SinkError::Poisoned("output channel"))?;
        if self.max_lines == 0 {
            return Ok(());
        }
        if lines.len() >= self.max_lines {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
        Ok(())
    }
}

/// Host whose panels live in memory
pub struct MemoryHost {
    capacity: usize,
    channels: Mutex<Vec<Arc<MemoryChannel>>>,
}

impl MemoryHost {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Mutex::new(Vec::new()),
        }
    }

    /// Panels created so far, in creation order
    pub fn channels(&self) -> Vec<Arc<MemoryChannel>> {
        self.channels
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Look up a panel by name
    pub fn channel(&self, name: &str) -> Option<Arc<MemoryChannel>> {
        self.channels().into_iter().find(|c| c.name() == name)
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_CAPACITY)
    }
}

impl Host for MemoryHost {
    fn create_output_channel(&self, name: &str) -> Arc<dyn OutputChannel> {
        let channel = Arc::new(MemoryChannel::new(name, self.capacity));
        if let Ok(mut channels) = self.channels.lock() {
            channels.push(Arc::clone(&channel));
        }
        channel
    }
}
