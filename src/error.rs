//! Error types for object mapping.
//!
//! Every failure the mapper can report is a variant of [`Error`]. The variants fall
//! into the categories below; each category is raised at a specific phase.
//!
//! ## Error Categories
//!
//! - **Configuration errors** (resolution time): name collisions after renaming,
//!   cyclic unwrap chains, fragments that cannot be merged, unknown classes
//! - **Required-value errors** (serialize time): a required virtual attribute or
//!   property has no value; also raised on read when a required property is missing
//! - **Structural errors** (deserialize time): root-wrapper mismatch, rejected
//!   unknown keys, a non-object node where an object was expected
//! - **Conversion errors** (both directions): a value does not match the declared
//!   type descriptor of its member
//! - **Codec errors**: the text form could not be encoded or decoded
//!
//! ## Examples
//!
//! ```rust
//! use serde_mapper::Error;
//!
//! let err = Error::conversion("User.id", "number", "string");
//! assert!(err.to_string().contains("User.id"));
//! assert!(err.is_conversion());
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while resolving plans or mapping values.
///
/// Each variant carries enough context (class, member, key) to localize the fault.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Conflicting or invalid configuration found while resolving a class
    #[error("Configuration error in class `{class}`: {msg}")]
    Configuration { class: String, msg: String },

    /// Two entries of a resolved plan ended up with the same wire name
    #[error("Configuration error in class `{class}`: duplicate property name `{name}` after naming transforms")]
    NameCollision { class: String, name: String },

    /// Unwrap expansion would never terminate
    #[error("Configuration error: cyclic unwrap chain {}", chain.join(" -> "))]
    CyclicUnwrap { chain: Vec<String> },

    /// A class was referenced that the registry knows nothing about
    #[error("Configuration error: unknown class `{0}`")]
    UnknownClass(String),

    /// A required value was not supplied
    #[error("Required value missing in class `{class}`: `{key}`")]
    RequiredValue { class: String, key: String },

    /// The root wrapper of a document did not match the expected name
    #[error("Structural error: expected root wrapper `{expected}`, found {found}")]
    RootWrapper { expected: String, found: String },

    /// A document key matched no property of the class
    #[error("Structural error in class `{class}`: unrecognized property `{key}`")]
    UnknownProperty { class: String, key: String },

    /// Any other document-shape problem
    #[error("Structural error: {0}")]
    Structural(String),

    /// A value did not match the declared type of its member
    #[error("Conversion error at `{member}`: expected {expected}, found {found}")]
    Conversion {
        member: String,
        expected: String,
        found: String,
    },

    /// Text encode/decode failure
    #[error("Codec error: {0}")]
    Codec(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates a configuration error for `class`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mapper::Error;
    ///
    /// let err = Error::configuration("User", "unwrap requires a class type");
    /// assert!(err.to_string().contains("User"));
    /// ```
    pub fn configuration(class: &str, msg: impl Into<String>) -> Self {
        Error::Configuration {
            class: class.to_string(),
            msg: msg.into(),
        }
    }

    pub fn name_collision(class: &str, name: &str) -> Self {
        Error::NameCollision {
            class: class.to_string(),
            name: name.to_string(),
        }
    }

    pub fn cyclic_unwrap(chain: Vec<String>) -> Self {
        Error::CyclicUnwrap { chain }
    }

    pub fn unknown_class(class: &str) -> Self {
        Error::UnknownClass(class.to_string())
    }

    /// Creates a required-value error naming the missing key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mapper::Error;
    ///
    /// let err = Error::required_value("User", "version");
    /// assert!(err.to_string().contains("version"));
    /// ```
    pub fn required_value(class: &str, key: &str) -> Self {
        Error::RequiredValue {
            class: class.to_string(),
            key: key.to_string(),
        }
    }

    pub fn root_wrapper(expected: &str, found: impl Into<String>) -> Self {
        Error::RootWrapper {
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    pub fn unknown_property(class: &str, key: &str) -> Self {
        Error::UnknownProperty {
            class: class.to_string(),
            key: key.to_string(),
        }
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Error::Structural(msg.into())
    }

    /// Creates a conversion error with the member path and the expected and actual shapes.
    pub fn conversion(member: &str, expected: &str, found: &str) -> Self {
        Error::Conversion {
            member: member.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn codec<T: fmt::Display>(msg: T) -> Self {
        Error::Codec(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors raised while resolving a plan.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. }
                | Error::NameCollision { .. }
                | Error::CyclicUnwrap { .. }
                | Error::UnknownClass(_)
        )
    }

    #[must_use]
    pub fn is_required_value(&self) -> bool {
        matches!(self, Error::RequiredValue { .. })
    }

    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::RootWrapper { .. } | Error::UnknownProperty { .. } | Error::Structural(_)
        )
    }

    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::io(&err.to_string())
        } else {
            Error::codec(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
