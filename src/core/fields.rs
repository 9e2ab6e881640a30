//! Ordered key-value field sets
//!
//! A [`FieldSet`] is what enrichment produces and what a [`Logger`] carries.
//! Keys are not validated: inserting a key that is already present replaces
//! the earlier value, so later enrichment shadows earlier enrichment.
//!
//! [`Logger`]: crate::Logger

use super::field_value::FieldValue;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Common field names for consistent logging across applications
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_SPAN_ID: &str = "span_id";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_ERROR: &str = "error";
pub const FIELD_DURATION: &str = "duration_ms";

/// Ordered mapping from field name to [`FieldValue`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<(String, FieldValue)>,
}

impl FieldSet {
    /// Create a new empty field set
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field, replacing any earlier value under the same key
    ///
    /// ```
    /// use logwrap::FieldSet;
    ///
    /// let fields = FieldSet::new()
    ///     .with_field("attempt", 1)
    ///     .with_field("attempt", 2);
    /// assert_eq!(fields.len(), 1);
    /// assert_eq!(fields.get("attempt").map(ToString::to_string), Some("2".into()));
    /// ```
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.add_field(key, value);
        self
    }

    /// Add a field (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        self.fields.retain(|(k, _)| *k != key);
        self.fields.push((key, value.into()));
    }

    /// Merge another set into this one; `other` wins on collisions
    pub fn merge(&mut self, other: &FieldSet) {
        for (key, value) in other.iter() {
            self.add_field(key, value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        set.extend(iter);
        set
    }
}

impl<K, V> Extend<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add_field(key, value);
        }
    }
}
