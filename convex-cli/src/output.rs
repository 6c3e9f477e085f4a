use console::style;
use serde_json::Value;

/// Text printed for a function result, or `None` when there is nothing to print.
///
/// Strings are printed as-is, `null` prints nothing and every other value is
/// pretty-printed JSON.
pub fn render_result(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => serde_json::to_string_pretty(other).ok(),
    }
}

/// Print a function result to stdout.
pub fn result(value: &Value) {
    if let Some(text) = render_result(value) {
        println!("{}", text);
    }
}

/// Print a warning message to stderr.
pub fn warning(msg: &str) {
    eprintln!("{}", style(msg).yellow());
}

/// Print an error message to stderr.
pub fn error(msg: &str) {
    eprintln!("{}", style(msg).red().bold());
}
