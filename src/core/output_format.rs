//! Output format configuration for log entries
//!
//! Provides the two renderings an entry can take:
//! - Console: Human-readable format (default)
//! - Json: One machine-readable JSON object per line

use super::fields::FieldSet;
use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;

/// Key of the timestamp in JSON output
pub const TIME_KEY: &str = "time";
/// Key of the level in JSON output
pub const LEVEL_KEY: &str = "level";
/// Key of the `file:line` location in JSON output
pub const CALLER_KEY: &str = "caller";
/// Key of the message in JSON output
pub const MESSAGE_KEY: &str = "message";

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `[2025-01-08T10:30:45Z] [INFO ] Request processed status=200`
    #[default]
    Console,

    /// JSON format for machine processing
    ///
    /// Example: `{"level":"info","message":"Request processed","status":200,"time":"2025-01-08T10:30:45Z"}`
    Json,
}

impl OutputFormat {
    /// `console` (or nothing) selects the human-readable format; any other
    /// name selects JSON.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "console" => OutputFormat::Console,
            _ => OutputFormat::Json,
        }
    }

    /// Format a log entry according to this output format
    pub fn format(
        &self,
        entry: &LogEntry,
        timestamp_format: &TimestampFormat,
        use_colors: bool,
    ) -> String {
        match self {
            OutputFormat::Console => format_console(entry, timestamp_format, use_colors),
            OutputFormat::Json => format_json(entry, timestamp_format),
        }
    }
}

fn format_console(entry: &LogEntry, timestamp_format: &TimestampFormat, use_colors: bool) -> String {
    let level_str = format!("{:5}", entry.level.to_str());
    let level_str = colorize(level_str, entry, use_colors);
    let timestamp_str = timestamp_format.format(&entry.timestamp);

    let base = match entry.caller() {
        Some(caller) => format!(
            "[{}] [{}] {} - {}",
            timestamp_str, level_str, caller, entry.message
        ),
        None => format!("[{}] [{}] {}", timestamp_str, level_str, entry.message),
    };

    if entry.fields.is_empty() {
        base
    } else {
        format!("{} {}", base, entry.fields.format_fields())
    }
}

#[cfg(feature = "console")]
fn colorize(level_str: String, entry: &LogEntry, use_colors: bool) -> String {
    use colored::Colorize;

    if use_colors {
        level_str.color(entry.level.color_code()).to_string()
    } else {
        level_str
    }
}

#[cfg(not(feature = "console"))]
fn colorize(level_str: String, _entry: &LogEntry, _use_colors: bool) -> String {
    level_str
}

fn format_json(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
    let mut json_obj = serde_json::Map::new();

    json_obj.insert(
        LEVEL_KEY.to_string(),
        serde_json::Value::String(entry.level.name().to_string()),
    );
    json_obj.insert(
        TIME_KEY.to_string(),
        timestamp_format.to_json_value(&entry.timestamp),
    );
    if let Some(caller) = entry.caller() {
        json_obj.insert(CALLER_KEY.to_string(), serde_json::Value::String(caller));
    }

    insert_fields(&mut json_obj, &entry.fields);

    json_obj.insert(
        MESSAGE_KEY.to_string(),
        serde_json::Value::String(entry.message.clone()),
    );

    serde_json::Value::Object(json_obj).to_string()
}

/// Prefix for user fields whose name collides with a record key
pub const CLASH_PREFIX: &str = "fields.";

/// Record keys never overwritten by user fields
const RESERVED_KEYS: [&str; 4] = [LEVEL_KEY, TIME_KEY, CALLER_KEY, MESSAGE_KEY];

fn insert_fields(json_obj: &mut serde_json::Map<String, serde_json::Value>, fields: &FieldSet) {
    for (key, value) in fields.iter() {
        let key = if RESERVED_KEYS.contains(&key) {
            format!("{}{}", CLASH_PREFIX, key)
        } else {
            key.to_string()
        };
        json_obj.insert(key, value.to_json_value());
    }
}
