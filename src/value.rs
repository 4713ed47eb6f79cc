//! Instance-side data model.
//!
//! The mapper walks live object instances. In this crate an instance is an [`Instance`]:
//! the name of its class plus an ordered set of member values. Member values are
//! [`Value`]s, which are richer than document nodes: they can hold dates, big integers
//! and nested instances, none of which exist in the document format.
//!
//! A member that has never been set is *absent*; this is different from a member
//! explicitly set to [`Value::Null`]. Absent members are skipped on serialize and left
//! untouched on deserialize.
//!
//! ```rust
//! use serde_mapper::{Instance, Value};
//!
//! let name = Instance::new("Name").with("first", "John").with("last", "Alfa");
//! let user = Instance::new("User").with("id", 1).with("name", name);
//!
//! assert_eq!(user.get("id"), Some(&Value::from(1)));
//! assert!(user.get("email").is_none());
//! ```

use crate::Number;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;

/// A member value held by an [`Instance`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    BigInt(BigInt),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(Box<Instance>),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of this value's runtime shape, used in conversion errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::BigInt(_) => "bigint",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    /// Returns `true` for null and for empty strings, lists and maps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_instance_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::Integer(value as i64))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Object(Box::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A live object: its class name and its member values in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    class: String,
    fields: IndexMap<String, Value>,
}

impl Instance {
    /// Creates an instance of `class` with no members set.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Instance {
            class: class.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder form of [`Instance::set`].
    #[must_use]
    pub fn with(mut self, member: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(member, value);
        self
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn get(&self, member: &str) -> Option<&Value> {
        self.fields.get(member)
    }

    pub fn get_mut(&mut self, member: &str) -> Option<&mut Value> {
        self.fields.get_mut(member)
    }

    pub fn set(&mut self, member: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(member.into(), value.into());
    }

    /// Makes `member` absent again.
    pub fn remove(&mut self, member: &str) -> Option<Value> {
        self.fields.shift_remove(member)
    }

    #[must_use]
    pub fn has(&self, member: &str) -> bool {
        self.fields.contains_key(member)
    }

    pub fn fields(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_not_null() {
        let mut user = Instance::new("User").with("email", Value::Null);
        assert!(user.has("email"));
        assert!(!user.has("id"));
        user.remove("email");
        assert!(user.is_empty());
    }

    #[test]
    fn test_empty_values() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(Value::Map(IndexMap::new()).is_empty());
        assert!(!Value::from(0).is_empty());
        assert!(!Value::from(Instance::new("Empty")).is_empty());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
