//! Log entries and their extra fields

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::level::Level;

/// Extra structured fields of an entry, kept in insertion order
pub type Fields = Map<String, Value>;

/// Keys owned by the entry itself; never rendered as extra fields
pub const RESERVED_KEYS: &[&str] = &["level", "message", "timestamp", "splat"];

/// A single log call, consumed immediately by the sinks
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    /// ISO-8601 UTC timestamp with millisecond precision
    pub timestamp: String,
    pub fields: Fields,
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(level, message, Utc::now())
    }

    /// Create an entry stamped with the given time
    pub fn at(level: Level, message: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: format_timestamp(time),
            fields: Fields::new(),
        }
    }

    /// Add an extra field. Reserved keys are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_field(key, value);
        self
    }

    /// Insert an extra field in place. Reserved keys are ignored.
    pub fn insert_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if !is_reserved(&key) {
            self.fields.insert(key, value.into());
        }
    }

    /// Merge every non-reserved key of `object` into the extra fields
    pub fn merge_fields(&mut self, object: &Fields) {
        for (key, value) in object {
            if !is_reserved(key) {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Whether any extra field holds a truthy value
    pub fn has_data(&self) -> bool {
        self.fields.values().any(is_truthy)
    }
}

/// Render a time the way entries are stamped (`2026-10-16T09:30:00.123Z`)
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Check whether a key belongs to the entry rather than its extra fields
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Truthiness of a field value: null, false, zero and "" are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_timestamp_format() {
        let time = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(time), "2026-10-16T09:30:00.000Z");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("a")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_reserved_keys_are_ignored() {
        let entry = LogEntry::new(Level::Info, "hi")
            .with_field("message", "other")
            .with_field("timestamp", "now")
            .with_field("file", "a.ts");
        assert_eq!(entry.fields.len(), 1);
        assert_eq!(entry.fields["file"], json!("a.ts"));
        assert_eq!(entry.message, "hi");
    }

    #[test]
    fn test_merge_fields_overwrites_in_place() {
        let mut entry = LogEntry::new(Level::Info, "hi").with_field("a", 1).with_field("b", 2);
        let extra = json!({"a": 3, "level": "error", "c": 4});
        entry.merge_fields(extra.as_object().unwrap());

        let keys: Vec<&str> = entry.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(entry.fields["a"], json!(3));
        assert_eq!(entry.level, Level::Info);
    }

    #[test]
    fn test_has_data() {
        let empty = LogEntry::new(Level::Info, "hi");
        assert!(!empty.has_data());

        let falsy = LogEntry::new(Level::Info, "hi")
            .with_field("x", Value::Null)
            .with_field("y", "");
        assert!(!falsy.has_data());

        let truthy = falsy.with_field("z", 1);
        assert!(truthy.has_data());
    }
}
