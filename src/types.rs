//! Declared-type descriptors.
//!
//! Every member carries a [`TypeDescriptor`] registered alongside it. The engines use
//! the descriptor, never the runtime value, to decide how a member converts: a member
//! can be null or absent and its declared shape is still known.
//!
//! ```rust
//! use serde_mapper::TypeDescriptor;
//!
//! let tags = TypeDescriptor::list(TypeDescriptor::String);
//! assert_eq!(tags.to_string(), "list<string>");
//! assert_eq!(TypeDescriptor::class("Name").class_name(), Some("Name"));
//! ```

use std::fmt;

/// The declared shape of a member.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum TypeDescriptor {
    /// No declared type; values convert structurally.
    #[default]
    Any,
    Bool,
    /// Integer or float.
    Number,
    /// Whole numbers only.
    Integer,
    String,
    /// RFC 3339 string on the wire.
    Date,
    /// Number on the wire when it fits `i64`, decimal string otherwise.
    BigInt,
    List(Box<TypeDescriptor>),
    /// String-keyed map.
    Map(Box<TypeDescriptor>),
    /// A registered class, mapped with its own resolved plan.
    Class(String),
}

impl TypeDescriptor {
    #[must_use]
    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    #[must_use]
    pub fn map(value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(value))
    }

    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        TypeDescriptor::Class(name.into())
    }

    /// Returns the class name for [`TypeDescriptor::Class`].
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Any => write!(f, "any"),
            TypeDescriptor::Bool => write!(f, "boolean"),
            TypeDescriptor::Number => write!(f, "number"),
            TypeDescriptor::Integer => write!(f, "integer"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::Date => write!(f, "date"),
            TypeDescriptor::BigInt => write!(f, "bigint"),
            TypeDescriptor::List(element) => write!(f, "list<{}>", element),
            TypeDescriptor::Map(value) => write!(f, "map<{}>", value),
            TypeDescriptor::Class(name) => write!(f, "{}", name),
        }
    }
}
