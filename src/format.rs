use crate::record::{display_value, is_truthy, LogRecord};

/// Render every truthy field of `record` as a `Key: Value` line, in record
/// order, joined with newlines.
pub fn format_fields(record: &LogRecord) -> String {
    record
        .iter()
        .filter(|(_, value)| is_truthy(value))
        .map(|(key, value)| format!("{}: {}", label(key), display_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `client_name` -> `Client Name`.
pub fn label(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// Uppercase the first letter of every alphabetic run and lowercase the
/// rest, so `userID` becomes `Userid` and `http2xx` becomes `Http2Xx`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
