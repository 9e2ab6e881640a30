//! Timestamp formatting utilities
//!
//! Resolves the configured time format string into a [`TimestampFormat`]:
//! well-known names select a fixed format, the empty string selects RFC 3339,
//! and anything else is used as a strftime pattern.

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use logwrap::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::resolve("").format(&t), "2025-01-08T10:30:45Z");
/// assert_eq!(TimestampFormat::resolve("%H:%M").format(&t), "10:30");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// RFC 3339 with second precision: `2025-01-08T10:30:45Z`
    #[default]
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Resolve a configured time format.
    ///
    /// Names are matched case-insensitively: `rfc3339`, `iso8601`,
    /// `iso8601micros`, `unix`, `unixms`, `unixmicros`.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "rfc3339" => TimestampFormat::Rfc3339,
            "iso8601" => TimestampFormat::Iso8601,
            "iso8601micros" => TimestampFormat::Iso8601Micros,
            "unix" => TimestampFormat::Unix,
            "unixms" => TimestampFormat::UnixMillis,
            "unixmicros" => TimestampFormat::UnixMicros,
            _ => TimestampFormat::Custom(name.to_string()),
        }
    }

    /// Format a `DateTime<Utc>` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => {
                use std::fmt::Write;
                let mut out = String::new();
                // chrono reports an invalid pattern as a formatting error
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    return TimestampFormat::Rfc3339.format(datetime);
                }
                out
            }
        }
    }

    /// Timestamp as a JSON value: numbers for Unix formats, strings otherwise
    #[must_use]
    pub fn to_json_value(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::Unix => datetime.timestamp().into(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().into(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().into(),
            _ => serde_json::Value::String(self.format(datetime)),
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_default_is_rfc3339() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Rfc3339);
        assert_eq!(TimestampFormat::resolve(""), TimestampFormat::Rfc3339);
        assert_eq!(
            TimestampFormat::Rfc3339.format(&fixed_datetime()),
            "2025-01-08T10:30:45Z"
        );
    }

    #[test]
    fn test_resolve_named_formats() {
        assert_eq!(TimestampFormat::resolve("ISO8601"), TimestampFormat::Iso8601);
        assert_eq!(TimestampFormat::resolve("unixms"), TimestampFormat::UnixMillis);
        assert_eq!(
            TimestampFormat::resolve("%Y/%m/%d"),
            TimestampFormat::Custom("%Y/%m/%d".to_string())
        );
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let result = TimestampFormat::Iso8601Micros.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456Z");
    }

    #[test]
    fn test_unix_formats_are_numeric() {
        let unix: i64 = TimestampFormat::Unix.format(&fixed_datetime()).parse().unwrap();
        let millis: i64 = TimestampFormat::UnixMillis
            .format(&fixed_datetime())
            .parse()
            .unwrap();
        assert!(millis > unix);
        assert!(TimestampFormat::UnixMicros.to_json_value(&fixed_datetime()).is_number());
        assert!(TimestampFormat::Rfc3339.to_json_value(&fixed_datetime()).is_string());
        assert!(!TimestampFormat::Custom("%Y".to_string()).is_numeric());
    }

    #[test]
    fn test_custom_apache_format() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S +0000".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45 +0000");
    }

    #[test]
    fn test_invalid_pattern_falls_back() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45Z");
    }
}
