//! Field extraction from structured values
//!
//! Types describe their loggable members through [`LogFields`], either by
//! hand with [`StructFields`] or with the [`log_fields!`](crate::log_fields)
//! macro. Each member may carry a `log` tag and a `json` tag; the name used
//! in the resulting [`FieldSet`] is resolved as:
//!
//! 1. the `log` tag,
//! 2. the `json` tag up to its first comma,
//! 3. the declared member name through [`to_snake_case`].
//!
//! A member that resolves to `-` is excluded, as is an optional member that
//! holds no value. Members that a type does not describe are never extracted.

use super::field_value::FieldValue;
use super::fields::FieldSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Name that excludes a member from extraction
pub const SKIP_TAG: &str = "-";

/// A value that can appear as a member of a [`LogFields`] type.
///
/// `None` means the member holds nothing and is left out of the extracted
/// set, which is how optional members behave.
pub trait ToField {
    fn to_field(&self) -> Option<FieldValue>;
}

/// A type that can describe its loggable members
pub trait LogFields {
    /// Record every loggable member in declaration order. Types that are not
    /// records leave `fields` untouched.
    fn describe(&self, _fields: &mut StructFields) {}
}

/// One described member and its tags
#[derive(Debug, Clone)]
pub struct Member {
    declared: &'static str,
    log_tag: Option<&'static str>,
    json_tag: Option<&'static str>,
    value: Option<FieldValue>,
}

impl Member {
    /// Set the `log` tag
    pub fn log(&mut self, tag: &'static str) -> &mut Self {
        self.log_tag = Some(tag);
        self
    }

    /// Set the `json` tag; anything after the first comma is ignored
    pub fn json(&mut self, tag: &'static str) -> &mut Self {
        self.json_tag = Some(tag);
        self
    }

    /// Field name after tag precedence
    pub fn resolved_name(&self) -> String {
        if let Some(tag) = self.log_tag.filter(|t| !t.is_empty()) {
            return tag.to_string();
        }
        if let Some(name) = self
            .json_tag
            .and_then(|t| t.split(',').next())
            .filter(|n| !n.is_empty())
        {
            return name.to_string();
        }
        to_snake_case(self.declared)
    }
}

/// Declarative builder a [`LogFields`] implementation fills in
#[derive(Debug, Default)]
pub struct StructFields {
    members: Vec<Member>,
}

impl StructFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe a member by its declared name and current value
    pub fn member<T>(&mut self, declared: &'static str, value: &T) -> &mut Member
    where
        T: ToField + ?Sized,
    {
        self.members.push(Member {
            declared,
            log_tag: None,
            json_tag: None,
            value: value.to_field(),
        });
        let last = self.members.len() - 1;
        &mut self.members[last]
    }

    /// Describe a member of any serializable type
    ///
    /// The value is captured through [`FieldValue::any`]; one that
    /// serializes to `null` counts as absent.
    pub fn member_serialized<T>(&mut self, declared: &'static str, value: &T) -> &mut Member
    where
        T: Serialize + ?Sized,
    {
        let value = match FieldValue::any(value) {
            FieldValue::Json(serde_json::Value::Null) | FieldValue::Null => None,
            captured => Some(captured),
        };
        self.members.push(Member {
            declared,
            log_tag: None,
            json_tag: None,
            value,
        });
        let last = self.members.len() - 1;
        &mut self.members[last]
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Apply name resolution and skip rules
    pub fn into_field_set(self) -> FieldSet {
        let mut set = FieldSet::new();
        for member in self.members {
            let name = member.resolved_name();
            if name == SKIP_TAG {
                continue;
            }
            if let Some(value) = member.value {
                set.add_field(name, value);
            }
        }
        set
    }
}

/// Extract the loggable fields of `value`
///
/// ```
/// use logwrap::{extract_fields, log_fields, FieldValue};
///
/// struct Request {
///     id: String,
///     user: String,
///     token: String,
///     retry: Option<u32>,
/// }
///
/// log_fields!(Request {
///     id(log = "request_id"),
///     user(json = "user_name,omitempty"),
///     token(log = "-"),
///     retry,
/// });
///
/// let request = Request {
///     id: "r-1".into(),
///     user: "ada".into(),
///     token: "secret".into(),
///     retry: None,
/// };
/// let fields = extract_fields(&request);
///
/// assert_eq!(fields.get("request_id"), Some(&FieldValue::Str("r-1".into())));
/// assert_eq!(fields.get("user_name"), Some(&FieldValue::Str("ada".into())));
/// assert!(!fields.contains_key("token"));
/// assert!(!fields.contains_key("retry"));
/// ```
pub fn extract_fields<T>(value: &T) -> FieldSet
where
    T: LogFields + ?Sized,
{
    let mut fields = StructFields::new();
    value.describe(&mut fields);
    fields.into_field_set()
}

/// Convert PascalCase/camelCase to snake_case, one character at a time.
///
/// Every uppercase letter after the first character gets a preceding `_`,
/// so runs of capitals are split letter by letter:
///
/// ```
/// use logwrap::to_snake_case;
///
/// assert_eq!(to_snake_case("UserName"), "user_name");
/// assert_eq!(to_snake_case("UserID"), "user_i_d");
/// assert_eq!(to_snake_case("IP"), "i_p");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

macro_rules! impl_to_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToField for $ty {
                fn to_field(&self) -> Option<FieldValue> {
                    Some(FieldValue::from(self.clone()))
                }
            }
        )*
    };
}

impl_to_field! {
    String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool,
    Vec<u8>, Vec<String>, Duration, DateTime<Utc>, SystemTime, serde_json::Value,
}

impl ToField for str {
    fn to_field(&self) -> Option<FieldValue> {
        Some(FieldValue::from(self))
    }
}

impl ToField for FieldValue {
    fn to_field(&self) -> Option<FieldValue> {
        Some(self.clone())
    }
}

impl<T> ToField for Option<T>
where
    T: ToField,
{
    fn to_field(&self) -> Option<FieldValue> {
        self.as_ref().and_then(ToField::to_field)
    }
}

impl<T: ToField + ?Sized> ToField for &T {
    fn to_field(&self) -> Option<FieldValue> {
        (**self).to_field()
    }
}

impl<T: ToField + ?Sized> ToField for Box<T> {
    fn to_field(&self) -> Option<FieldValue> {
        (**self).to_field()
    }
}

impl<T: ToField + ?Sized> ToField for Arc<T> {
    fn to_field(&self) -> Option<FieldValue> {
        (**self).to_field()
    }
}

impl<T: ToField + ?Sized> ToField for Rc<T> {
    fn to_field(&self) -> Option<FieldValue> {
        (**self).to_field()
    }
}

// Scalars are not records: extracting from them yields nothing.
macro_rules! impl_empty_log_fields {
    ($($ty:ty),* $(,)?) => {
        $( impl LogFields for $ty {} )*
    };
}

impl_empty_log_fields! {
    str, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, (),
}

impl<T: LogFields> LogFields for Option<T> {
    fn describe(&self, fields: &mut StructFields) {
        if let Some(inner) = self {
            inner.describe(fields);
        }
    }
}

impl<T: LogFields + ?Sized> LogFields for &T {
    fn describe(&self, fields: &mut StructFields) {
        (**self).describe(fields);
    }
}

impl<T: LogFields + ?Sized> LogFields for Box<T> {
    fn describe(&self, fields: &mut StructFields) {
        (**self).describe(fields);
    }
}

impl<T: LogFields + ?Sized> LogFields for Arc<T> {
    fn describe(&self, fields: &mut StructFields) {
        (**self).describe(fields);
    }
}

/// Implement [`LogFields`] for a struct by listing its loggable members.
///
/// Each entry is a member name optionally followed by a parenthesized list
/// of `log = "..."` / `json = "..."` tags. Members are described in the order
/// they are listed. A list that starts with `serde` captures the member
/// through its `Serialize` implementation, for collections, nested structs
/// and other types without a [`ToField`] impl.
///
/// ```
/// use logwrap::{extract_fields, log_fields};
///
/// #[allow(non_snake_case)]
/// struct Peer {
///     IP: String,
///     port: u16,
/// }
///
/// log_fields!(Peer { IP, port(json = "peer_port") });
///
/// let fields = extract_fields(&Peer { IP: "10.0.0.1".into(), port: 22 });
/// assert!(fields.contains_key("i_p"));
/// assert!(fields.contains_key("peer_port"));
///
/// #[derive(serde::Serialize)]
/// struct Limits {
///     cpu: u32,
/// }
///
/// struct Job {
///     tags: Vec<&'static str>,
///     limits: Limits,
/// }
///
/// log_fields!(Job { tags(serde), limits(serde, log = "quota") });
///
/// let fields = extract_fields(&Job { tags: vec!["batch"], limits: Limits { cpu: 2 } });
/// assert_eq!(fields.get("tags").unwrap().to_json_value(), serde_json::json!(["batch"]));
/// assert_eq!(fields.get("quota").unwrap().to_json_value(), serde_json::json!({"cpu": 2}));
/// ```
#[macro_export]
macro_rules! log_fields {
    (@member $fields:ident, $name:expr, $value:expr; serde $(, $tag:ident = $tv:literal)* $(,)?) => {
        $fields.member_serialized($name, $value) $(.$tag($tv))*;
    };
    (@member $fields:ident, $name:expr, $value:expr; $($tag:ident = $tv:literal),* $(,)?) => {
        $fields.member($name, $value) $(.$tag($tv))*;
    };
    ($ty:ty { $($member:ident $(($($arg:tt)*))?),* $(,)? }) => {
        impl $crate::LogFields for $ty {
            fn describe(&self, fields: &mut $crate::StructFields) {
                $(
                    $crate::log_fields!(
                        @member fields, stringify!($member), &self.$member; $($($arg)*)?
                    );
                )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(non_snake_case)]
    struct Account {
        UserID: u64,
        DisplayName: String,
        email: String,
        password: String,
        nickname: Option<String>,
        manager: Option<String>,
        region: String,
    }

    crate::log_fields!(Account {
        UserID,
        DisplayName(json = "display,omitempty"),
        email(log = "contact", json = "mail"),
        password(log = "-"),
        nickname,
        manager(json = ",omitempty"),
        region(json = "-"),
    });

    fn account() -> Account {
        Account {
            UserID: 42,
            DisplayName: "Ada".into(),
            email: "ada@example.com".into(),
            password: "hunter2".into(),
            nickname: None,
            manager: Some("grace".into()),
            region: "eu".into(),
        }
    }

    #[test]
    fn test_snake_case_literal_rule() {
        assert_eq!(to_snake_case("UserID"), "user_i_d");
        assert_eq!(to_snake_case("RequestID"), "request_i_d");
        assert_eq!(to_snake_case("IP"), "i_p");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("camelCase"), "camel_case");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_tag_precedence() {
        let fields = extract_fields(&account());

        assert_eq!(fields.get("user_i_d"), Some(&FieldValue::U64(42)));
        assert_eq!(fields.get("display"), Some(&FieldValue::Str("Ada".into())));
        assert!(fields.contains_key("contact"));
        assert!(!fields.contains_key("mail"));
    }

    #[test]
    fn test_skip_rules() {
        let fields = extract_fields(&account());

        assert!(!fields.contains_key("password"));
        assert!(!fields.contains_key("-"));
        assert!(!fields.contains_key("nickname"));
        assert!(!fields.contains_key("region"));
        // empty json name falls through to the declared name
        assert_eq!(fields.get("manager"), Some(&FieldValue::Str("grace".into())));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_none_input_is_empty() {
        let missing: Option<Account> = None;
        assert!(extract_fields(&missing).is_empty());
        assert_eq!(extract_fields(&Some(account())).len(), 4);
    }

    #[test]
    fn test_non_record_input_is_empty() {
        assert!(extract_fields(&42_i32).is_empty());
        assert!(extract_fields("text").is_empty());
    }

    #[test]
    fn test_later_member_wins_on_collision() {
        struct Twin {
            first: String,
            second: String,
        }
        crate::log_fields!(Twin {
            first(log = "name"),
            second(log = "name"),
        });

        let fields = extract_fields(&Twin {
            first: "a".into(),
            second: "b".into(),
        });
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("name"), Some(&FieldValue::Str("b".into())));
    }

    #[test]
    fn test_serialized_members() {
        #[derive(serde::Serialize)]
        struct Address {
            city: String,
            zip: Option<String>,
        }

        struct Order {
            id: u64,
            items: Vec<u32>,
            shipping: Address,
            coupon: Option<Address>,
        }
        crate::log_fields!(Order {
            id,
            items(serde),
            shipping(serde, json = "ship_to,omitempty"),
            coupon(serde),
        });

        let fields = extract_fields(&Order {
            id: 7,
            items: vec![3, 5],
            shipping: Address {
                city: "Oslo".into(),
                zip: None,
            },
            coupon: None,
        });

        assert_eq!(fields.get("id"), Some(&FieldValue::U64(7)));
        assert_eq!(
            fields.get("items"),
            Some(&FieldValue::Json(serde_json::json!([3, 5])))
        );
        assert_eq!(
            fields.get("ship_to"),
            Some(&FieldValue::Json(serde_json::json!({"city": "Oslo", "zip": null})))
        );
        assert!(!fields.contains_key("coupon"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_manual_description() {
        struct Job {
            attempts: u32,
        }
        impl LogFields for Job {
            fn describe(&self, fields: &mut StructFields) {
                fields.member("Attempts", &self.attempts);
            }
        }

        let fields = extract_fields(&Arc::new(Job { attempts: 3 }));
        assert_eq!(fields.get("attempts"), Some(&FieldValue::U32(3)));
    }
}
