//! Typed values for structured logging fields
//!
//! Every value attached to a logger or an event is coerced into a
//! [`FieldValue`] up front, so rendering never has to inspect an unknown
//! type: each concrete Rust type maps onto the most specific variant, and
//! anything else goes through [`FieldValue::any`], which serializes it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Strs(Vec<String>),
    Duration(Duration),
    Time(DateTime<Utc>),
    /// Rendered message of an error
    Error(String),
    /// Generic serialized value for types without a dedicated variant
    Json(serde_json::Value),
    Null,
}

impl FieldValue {
    /// Capture an error as its message
    pub fn error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        FieldValue::Error(err.to_string())
    }

    /// Generic fallback: serialize any value into a JSON tree.
    ///
    /// A value whose `Serialize` implementation fails becomes `Null`.
    ///
    /// ```
    /// use logwrap::FieldValue;
    /// use std::collections::BTreeMap;
    ///
    /// let mut limits = BTreeMap::new();
    /// limits.insert("cpu", 2);
    /// let value = FieldValue::any(&limits);
    /// assert_eq!(value.to_json_value(), serde_json::json!({"cpu": 2}));
    /// ```
    pub fn any<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value)
            .map(FieldValue::Json)
            .unwrap_or(FieldValue::Null)
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::I8(i) => Value::from(*i),
            FieldValue::I16(i) => Value::from(*i),
            FieldValue::I32(i) => Value::from(*i),
            FieldValue::I64(i) => Value::from(*i),
            FieldValue::U8(u) => Value::from(*u),
            FieldValue::U16(u) => Value::from(*u),
            FieldValue::U32(u) => Value::from(*u),
            FieldValue::U64(u) => Value::from(*u),
            FieldValue::F32(f) => float_value(f64::from(*f)),
            FieldValue::F64(f) => float_value(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Bytes(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
            FieldValue::Strs(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Duration(d) => float_value(duration_millis(d)),
            FieldValue::Time(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            FieldValue::Error(msg) => Value::String(msg.clone()),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => Value::Null,
        }
    }
}

fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn duration_millis(d: &Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Error(s) => write!(f, "{}", s),
            FieldValue::I8(i) => write!(f, "{}", i),
            FieldValue::I16(i) => write!(f, "{}", i),
            FieldValue::I32(i) => write!(f, "{}", i),
            FieldValue::I64(i) => write!(f, "{}", i),
            FieldValue::U8(u) => write!(f, "{}", u),
            FieldValue::U16(u) => write!(f, "{}", u),
            FieldValue::U32(u) => write!(f, "{}", u),
            FieldValue::U64(u) => write!(f, "{}", u),
            FieldValue::F32(fl) => write!(f, "{}", fl),
            FieldValue::F64(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            FieldValue::Strs(items) => write!(f, "[{}]", items.join(",")),
            FieldValue::Duration(d) => write!(f, "{}ms", duration_millis(d)),
            FieldValue::Time(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    String => Str,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    Vec<u8> => Bytes,
    Vec<String> => Strs,
    Duration => Duration,
    DateTime<Utc> => Time,
    serde_json::Value => Json,
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Str(s.clone())
    }
}

impl From<isize> for FieldValue {
    fn from(i: isize) -> Self {
        FieldValue::I64(i as i64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::U64(u as u64)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        FieldValue::Bytes(b.to_vec())
    }
}

impl From<&[String]> for FieldValue {
    fn from(items: &[String]) -> Self {
        FieldValue::Strs(items.to_vec())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::Strs(items.into_iter().map(String::from).collect())
    }
}

impl From<SystemTime> for FieldValue {
    fn from(t: SystemTime) -> Self {
        FieldValue::Time(t.into())
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
