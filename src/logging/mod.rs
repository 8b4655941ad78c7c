//! Multi-destination logging for the extension
//!
//! Log calls fan out synchronously to a console sink, a rotating log file and the
//! editor's output panel, each entry rendered once as a timestamped line with an
//! optional JSON blob of extra fields.

mod console;
mod entry;
mod exceptions;
mod factory;
mod file_writer;
mod format;
mod layer;
mod level;
mod logger;
mod panel;
pub mod rotation;
mod sink;

pub use console::{ConsoleSink, ConsoleStream};
pub use entry::{format_timestamp, is_truthy, Fields, LogEntry};
pub use exceptions::{exception_entry, ExceptionHandler};
pub use factory::{LoggerFactory, SinkRegistry};
pub use file_writer::{FileOptions, FileSink};
pub use format::{apply_splat, format_entry};
pub use layer::LoggerLayer;
pub use level::{Level, UnknownLevel};
pub use logger::{Logged, Logger, Timer};
pub use panel::PanelSink;
pub use sink::{FormattedEntry, Sink, SinkError};
