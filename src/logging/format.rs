//! Entry formatting
//!
//! Turns a log call into a single line: printf-style substitution of the call
//! arguments (splat), then `"<timestamp> - <level>: <message>"` with a JSON blob
//! of the extra fields when any of them is truthy.

use serde_json::Value;

use super::entry::LogEntry;

/// Render an entry as one line
pub fn format_entry(entry: &LogEntry) -> String {
    let line = format!("{} - {}: {}", entry.timestamp, entry.level, entry.message);
    if !entry.has_data() {
        return line;
    }
    match serde_json::to_string(&entry.fields) {
        Ok(data) => format!("{} {}", line, data),
        Err(_) => line,
    }
}

/// Merge call arguments into an entry
///
/// Arguments are consumed by the message's format tokens in order; surplus
/// object arguments become extra fields. Without tokens, every object argument
/// becomes extra fields. Other surplus arguments are dropped.
pub fn apply_splat(entry: &mut LogEntry, args: &[Value]) {
    if args.is_empty() {
        return;
    }

    let tokens = count_tokens(&entry.message);
    if tokens.total == 0 {
        merge_objects(entry, args);
        return;
    }

    let expected = tokens.total - tokens.escapes;
    let (consumed, surplus) = args.split_at(expected.min(args.len()));
    merge_objects(entry, surplus);

    if !consumed.is_empty() {
        entry.message = substitute(&entry.message, consumed);
    }
}

fn merge_objects(entry: &mut LogEntry, args: &[Value]) {
    for arg in args {
        if let Value::Object(object) = arg {
            entry.merge_fields(object);
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct TokenCount {
    /// Every `%x` token, escapes included
    total: usize,
    /// `%%` escapes
    escapes: usize,
}

fn is_token(c: char) -> bool {
    matches!(c, 's' | 'c' | 'd' | 'j' | 'i' | 'f' | 'o' | 'O' | '%')
}

fn count_tokens(message: &str) -> TokenCount {
    let mut count = TokenCount::default();
    let mut chars = message.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some('%') => {
                count.total += 1;
                count.escapes += 1;
            }
            Some(next) if is_token(next) => count.total += 1,
            _ => {}
        }
    }
    count
}

fn substitute(message: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(message.len());
    let mut args = args.iter();
    let mut chars = message.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&spec) = chars.peek() else {
            out.push('%');
            continue;
        };
        if spec == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !is_token(spec) {
            out.push('%');
            continue;
        }
        chars.next();
        match args.next() {
            Some(arg) => out.push_str(&render_arg(spec, arg)),
            None => {
                out.push('%');
                out.push(spec);
            }
        }
    }
    out
}

fn render_arg(spec: char, arg: &Value) -> String {
    match (spec, arg) {
        // Integers render exactly, never through f64
        ('s' | 'd' | 'i' | 'f', Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        ('s', Value::String(s)) => s.clone(),
        ('s', Value::Number(n)) => n.as_f64().map(js_number).unwrap_or_else(|| n.to_string()),
        ('s', other) => other.to_string(),
        ('d' | 'f', _) => js_number(to_number(arg)),
        ('i', _) => js_number(to_number(arg).trunc()),
        ('c', _) => String::new(),
        _ => arg.to_string(),
    }
}

fn to_number(arg: &Value) -> f64 {
    match arg {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Render a number without a trailing `.0` for integral values
fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}
