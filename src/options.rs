//! Per-call mapping options.
//!
//! - [`SerializeOptions`]: the attribute map for virtual attributes and output flags
//! - [`DeserializeOptions`]: the target class and the unknown-key policy
//!
//! ## Examples
//!
//! ```rust
//! use serde_mapper::{DeserializeOptions, SerializeOptions};
//!
//! let options = SerializeOptions::new()
//!     .with_attribute("version", 1.2)
//!     .with_wrap_root_value(true);
//! assert!(options.attributes.contains_key("version"));
//!
//! let options = DeserializeOptions::new("User").with_fail_on_unknown_properties(true);
//! assert_eq!(options.main_class, "User");
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};

/// Caller-supplied ambient values looked up by virtual attributes.
///
/// ```rust
/// use serde_mapper::{Attributes, Value};
///
/// let attributes = Attributes::new().with("version", 1.2).with("region", "eu");
/// assert_eq!(attributes.get("region"), Some(&Value::from("eu")));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(IndexMap<String, Value>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl Deref for Attributes {
    type Target = IndexMap<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Attributes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Options for one serialize call.
///
/// # Examples
///
/// ```rust
/// use serde_mapper::{Attributes, SerializeOptions};
///
/// let options = SerializeOptions::pretty()
///     .with_attributes(Attributes::new().with("version", 1.2));
/// assert!(options.pretty);
/// assert_eq!(options.attributes.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SerializeOptions {
    /// Values for the class's virtual attributes.
    pub attributes: Attributes,
    /// Wrap the root object even when its class declares no root name.
    pub wrap_root_value: bool,
    /// Indented text output; ignored when producing a document tree.
    pub pretty: bool,
}

impl SerializeOptions {
    /// Creates default options: no attributes, no forced root wrapping, compact text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pretty() -> Self {
        SerializeOptions {
            pretty: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Adds one attribute, replacing a previous value under the same key.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_wrap_root_value(mut self, wrap: bool) -> Self {
        self.wrap_root_value = wrap;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Options for one deserialize call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Class of the root instance.
    pub main_class: String,
    /// Expect a root wrapper even when the class declares no root name.
    pub unwrap_root_value: bool,
    /// Reject document keys that match no property.
    pub fail_on_unknown_properties: bool,
    /// Reject document keys that match a virtual attribute or an ignored name.
    pub fail_on_virtual_properties: bool,
}

impl DeserializeOptions {
    /// Creates lenient options targeting `main_class`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mapper::DeserializeOptions;
    ///
    /// let options = DeserializeOptions::new("User");
    /// assert!(!options.unwrap_root_value);
    /// assert!(!options.fail_on_unknown_properties);
    /// ```
    #[must_use]
    pub fn new(main_class: impl Into<String>) -> Self {
        DeserializeOptions {
            main_class: main_class.into(),
            unwrap_root_value: false,
            fail_on_unknown_properties: false,
            fail_on_virtual_properties: false,
        }
    }

    #[must_use]
    pub fn with_unwrap_root_value(mut self, unwrap: bool) -> Self {
        self.unwrap_root_value = unwrap;
        self
    }

    #[must_use]
    pub fn with_fail_on_unknown_properties(mut self, fail: bool) -> Self {
        self.fail_on_unknown_properties = fail;
        self
    }

    #[must_use]
    pub fn with_fail_on_virtual_properties(mut self, fail: bool) -> Self {
        self.fail_on_virtual_properties = fail;
        self
    }
}
