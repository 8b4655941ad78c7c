//! Rotating file sink
//!
//! Appends lines to a single log file. Once a write leaves the file at or above
//! its size cap, the next write rotates it into the backup chain first.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::level::Level;
use super::rotation::{rotate_files, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE};
use super::sink::{FormattedEntry, Sink, SinkError};

/// Size cap and retained backups of a file sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    /// Size in bytes at which the file is rotated
    pub max_size: u64,
    /// Backup generations kept next to the active file
    pub max_files: usize,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

#[derive(Default)]
struct FileState {
    file: Option<File>,
    size: u64,
    rotate_pending: bool,
}

pub struct FileSink {
    level: Level,
    path: PathBuf,
    options: FileOptions,
    state: Mutex<FileState>,
}

impl FileSink {
    /// Create a sink for `dir/file_name`. Nothing is opened until the first write.
    pub fn new(level: Level, dir: &Path, file_name: &str, options: FileOptions) -> Self {
        Self {
            level,
            path: dir.join(file_name),
            options,
            state: Mutex::new(FileState::default()),
        }
    }

    /// Full path of the active log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> FileOptions {
        self.options
    }

    fn open(&self, state: &mut FileState) -> Result<(), SinkError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        state.size = file.metadata()?.len();
        state.rotate_pending = self.options.max_size > 0 && state.size >= self.options.max_size;
        state.file = Some(file);
        Ok(())
    }

    fn rotate(&self, state: &mut FileState) -> Result<(), SinkError> {
        state.file = None;
        rotate_files(&self.path, self.options.max_files)?;
        self.open(state)
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn level(&self) -> Option<Level> {
        Some(self.level)
    }

    fn write(&self, entry: &FormattedEntry) -> Result<(), SinkError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SinkError::Poisoned("log file"))?;

        if state.file.is_none() {
            self.open(&mut state)?;
        }
        if state.rotate_pending {
            self.rotate(&mut state)?;
        }

        let bytes = format!("{}\n", entry.line);
        let result = match state.file.as_mut() {
            Some(file) => file.write_all(bytes.as_bytes()).and_then(|_| file.flush()),
            None => return Ok(()),
        };

        match result {
            Ok(()) => {
                state.size += bytes.len() as u64;
                if self.options.max_size > 0 && state.size >= self.options.max_size {
                    state.rotate_pending = true;
                }
                Ok(())
            }
            Err(e) => {
                // Reopen on the next write
                state.file = None;
                Err(e.into())
            }
        }
    }
}
