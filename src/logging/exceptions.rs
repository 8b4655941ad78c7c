//! Uncaught exception capture
//!
//! Panics anywhere in the process are recorded as `error` entries on the
//! receiving sinks (the log file), bypassing their thresholds. The previously
//! installed panic hook still runs afterwards; nothing here aborts the process.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::ffi::OsString;
use std::panic;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{json, Value};

use super::entry::LogEntry;
use super::format::format_entry;
use super::level::Level;
use super::sink::{FormattedEntry, Sink};

#[derive(Default)]
pub struct ExceptionHandler {
    receivers: Mutex<Vec<Arc<dyn Sink>>>,
    installed: AtomicBool,
}

impl ExceptionHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a sink that receives exception records
    pub fn handle(&self, sink: Arc<dyn Sink>) {
        if let Ok(mut receivers) = self.receivers.lock() {
            receivers.push(sink);
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Write an exception record to every receiver
    ///
    /// Returns how many receivers accepted it.
    pub fn record(&self, message: &str, location: Option<&str>) -> usize {
        let entry = exception_entry(message, location);
        let formatted = FormattedEntry {
            level: entry.level,
            line: format_entry(&entry),
        };
        let receivers = match self.receivers.lock() {
            Ok(receivers) => receivers.clone(),
            Err(_) => return 0,
        };
        receivers
            .iter()
            .filter(|sink| sink.write(&formatted).is_ok())
            .count()
    }

    /// Install the process panic hook. Only the first call installs it.
    pub fn install(self: &Arc<Self>) -> bool {
        if self.installed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let handler = Arc::clone(self);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let message = panic_message(info.payload());
            let location = info.location().map(|l| l.to_string());
            handler.record(&message, location.as_deref());
            previous(info);
        }));
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Build the entry recorded for an uncaught exception
pub fn exception_entry(message: &str, location: Option<&str>) -> LogEntry {
    let process = process_field(std::env::args_os(), std::env::current_dir().ok());

    let mut entry = LogEntry::new(Level::Error, format!("uncaughtException: {}", message))
        .with_field("error", message)
        .with_field("location", location)
        .with_field("exception", true)
        .with_field("date", Utc::now().to_rfc2822())
        .with_field("process", process);

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        entry.insert_field("stack", backtrace.to_string());
    }
    entry
}

/// Describe the process; arguments and paths that are not UTF-8 are rendered lossily
fn process_field<I>(args: I, cwd: Option<PathBuf>) -> Value
where
    I: IntoIterator<Item = OsString>,
{
    let argv: Vec<String> = args
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let cwd = cwd
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    json!({
        "pid": std::process::id(),
        "cwd": cwd,
        "argv": argv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::file_writer::{FileOptions, FileSink};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_exception_entry_shape() {
        let entry = exception_entry("boom", Some("src/lib.rs:1:1"));
        assert_eq!(entry.level, Level::Error);
        assert_eq!(entry.message, "uncaughtException: boom");
        assert_eq!(entry.fields["error"], json!("boom"));
        assert_eq!(entry.fields["location"], json!("src/lib.rs:1:1"));
        assert_eq!(entry.fields["exception"], json!(true));
        assert_eq!(entry.fields["process"]["pid"], json!(std::process::id()));
    }

    #[test]
    fn test_record_writes_to_file_regardless_of_level() {
        let temp_dir = TempDir::new().unwrap();
        // Threshold that would normally reject error entries is irrelevant here
        let sink = Arc::new(FileSink::new(
            Level::Info,
            temp_dir.path(),
            "typescript-hero.log",
            FileOptions::default(),
        ));
        let handler = ExceptionHandler::new();
        handler.handle(sink.clone());

        assert_eq!(handler.record("disk exploded", None), 1);

        let content = fs::read_to_string(sink.path()).unwrap();
        assert!(content.contains(" - error: uncaughtException: disk exploded {"));
        assert!(content.contains("\"exception\":true"));
        assert!(content.contains("\"location\":null"));
    }

    #[test]
    fn test_installed_hook_records_panics() {
        let temp_dir = TempDir::new().unwrap();
        let sink = Arc::new(FileSink::new(
            Level::Info,
            temp_dir.path(),
            "typescript-hero.log",
            FileOptions::default(),
        ));
        let handler = ExceptionHandler::new();
        handler.handle(sink.clone());

        assert!(handler.install());
        assert!(!handler.install());
        assert!(handler.is_installed());

        let result = panic::catch_unwind(|| panic!("hooked panic"));
        assert!(result.is_err());

        let content = fs::read_to_string(sink.path()).unwrap();
        assert!(content.contains("uncaughtException: hooked panic"));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_field_tolerates_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let args = vec![
            OsString::from("hero"),
            OsString::from_vec(vec![0xff, b'x']),
        ];
        let cwd = PathBuf::from(OsString::from_vec(vec![b'/', 0xfe]));

        let process = process_field(args, Some(cwd));
        assert_eq!(process["argv"], json!(["hero", "\u{fffd}x"]));
        assert_eq!(process["cwd"], json!("/\u{fffd}"));
        assert_eq!(process["pid"], json!(std::process::id()));
    }

    #[test]
    fn test_process_field_without_cwd() {
        let process = process_field(Vec::<OsString>::new(), None);
        assert_eq!(process["argv"], json!([]));
        assert_eq!(process["cwd"], json!(""));
    }

    #[test]
    fn test_record_without_receivers() {
        let handler = ExceptionHandler::new();
        assert_eq!(handler.record("nobody listens", None), 0);
        assert_eq!(handler.receiver_count(), 0);
    }

    #[test]
    fn test_panic_message_payloads() {
        let text: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(text.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
