//! # serde_mapper
//!
//! A declarative object-to-document mapper. Classes and their members are described by
//! configuration fragments registered in a [`Registry`]; the mapper resolves those
//! fragments into one plan per class and uses it to turn live [`Instance`]s into JSON
//! documents and back.
//!
//! ## Key Features
//!
//! - **Fragment merge**: configuration for one member can be split across many
//!   registration calls; later calls win, descendant classes override ancestors
//! - **Virtual attributes**: document fields sourced from per-call values instead of the
//!   instance, placed before or after the members
//! - **Unwrapping**: flatten a nested object into its parent, with name prefix and suffix
//! - **Root wrapping**: wrap the document in a single key named after the class
//! - **Inclusion rules**: drop null, empty or default values per member or per class
//! - **Ordered output**: fields are written in plan order; the text codec keeps it
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_mapper::{
//!     from_str, to_string_with_options, Annotation, AppendAttribute, AppendOptions, Registry,
//!     Instance, SerializeOptions, TypeDescriptor, Value,
//! };
//!
//! let registry = Registry::global();
//! registry
//!     .annotate_class(
//!         "Account",
//!         Annotation::append(AppendOptions::new().attr(AppendAttribute::new("version"))),
//!     )?
//!     .annotate_property("Account", "id", Annotation::property())?
//!     .annotate_property("Account", "id", Annotation::class_type(TypeDescriptor::Number))?
//!     .annotate_property("Account", "email", Annotation::property())?
//!     .annotate_property("Account", "email", Annotation::class_type(TypeDescriptor::String))?;
//!
//! let account = Instance::new("Account")
//!     .with("id", 1)
//!     .with("email", "john.alfa@gmail.com");
//! let options = SerializeOptions::new().with_attribute("version", 1.2);
//! let json = to_string_with_options(&account, &options)?;
//! assert_eq!(json, r#"{"id":1,"email":"john.alfa@gmail.com","version":1.2}"#);
//!
//! // Virtual attributes are write-only: reading the document back ignores `version`.
//! let back = from_str(&json, "Account")?;
//! assert_eq!(back, account);
//! assert!(back.get("version").is_none());
//! # Ok::<(), serde_mapper::Error>(())
//! ```
//!
//! ## Unwrapping
//!
//! ```rust
//! use serde_mapper::{
//!     node, Annotation, Instance, ObjectMapper, Registry, SerializeOptions, TypeDescriptor,
//!     UnwrapOptions,
//! };
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::new());
//! registry
//!     .annotate_property("Name", "first", Annotation::property())?
//!     .annotate_property("Name", "last", Annotation::property())?
//!     .annotate_property("User", "id", Annotation::property())?
//!     .annotate_property("User", "name", Annotation::class_type(TypeDescriptor::class("Name")))?
//!     .annotate_property("User", "name", Annotation::property())?
//!     .annotate_property(
//!         "User",
//!         "name",
//!         Annotation::unwrapped_with(UnwrapOptions::new().prefix("name_")),
//!     )?;
//!
//! let user = Instance::new("User")
//!     .with("id", 1)
//!     .with("name", Instance::new("Name").with("first", "John").with("last", "Alfa"));
//! let mapper = ObjectMapper::new(registry);
//! let document = mapper.serialize(&user, &SerializeOptions::new())?;
//! assert_eq!(document, node!({"id": 1, "name_first": "John", "name_last": "Alfa"}));
//! # Ok::<(), serde_mapper::Error>(())
//! ```
//!
//! ## Document Trees
//!
//! [`Node`] is the in-memory document. It implements `serde::Serialize` and
//! `serde::Deserialize`, so JSON text goes through `serde_json`; [`to_document`] and
//! [`from_document`] skip the text step entirely.
//!
//! ## Error Handling
//!
//! Every operation returns [`Result`]. Configuration problems (name collisions, cyclic
//! unwrapping, conflicting fragments) surface on the first mapping call for a class;
//! see [`Error`] for the full taxonomy.

pub mod annotation;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod mapper;
pub mod node;
pub mod options;
pub mod plan;
pub mod registry;
mod resolve;
pub mod ser;
pub mod types;
pub mod value;

pub use annotation::{
    Annotation, AnnotationKey, AppendAttribute, AppendOptions, GetterOptions,
    IgnorePropertiesOptions, Inclusion, Position, PropertyOptions, PropertyOrderOptions,
    ReadFn, RootNameOptions, SetterOptions, UnwrapOptions, WriteFn,
};
pub use de::Deserializer;
pub use error::{Error, Result};
pub use map::NodeMap;
pub use mapper::ObjectMapper;
pub use node::{Node, Number};
pub use options::{Attributes, DeserializeOptions, SerializeOptions};
pub use plan::{
    PlanEntry, PropertySpec, ReadAccess, ResolvedPlan, RootWrapperSpec, UnwrapSpec,
    UnwrappedMember, VirtualAttributeSpec, WriteAccess,
};
pub use registry::{ClassDef, Fragment, MemberKind, MemberRef, Registry};
pub use ser::Serializer;
pub use types::TypeDescriptor;
pub use value::{Instance, Value};

use std::io;

/// Serialize an instance to a document tree using the global registry.
///
/// # Errors
///
/// Configuration, required-value and conversion errors.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_document(instance: &Instance, options: &SerializeOptions) -> Result<Node> {
    ObjectMapper::global().serialize(instance, options)
}

/// Serialize an instance to compact JSON using the global registry.
///
/// # Errors
///
/// Returns an error if the instance cannot be mapped.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(instance: &Instance) -> Result<String> {
    to_string_with_options(instance, &SerializeOptions::default())
}

/// Serialize an instance to indented JSON using the global registry.
///
/// # Errors
///
/// Returns an error if the instance cannot be mapped.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty(instance: &Instance) -> Result<String> {
    to_string_with_options(instance, &SerializeOptions::pretty())
}

/// Serialize an instance to JSON with per-call options (attributes, root wrapping,
/// pretty output).
///
/// # Errors
///
/// Returns an error if the instance cannot be mapped, for example when a required
/// virtual attribute is missing from `options.attributes`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(instance: &Instance, options: &SerializeOptions) -> Result<String> {
    ObjectMapper::global().stringify(instance, options)
}

/// Serialize an instance as JSON into a writer.
///
/// # Examples
///
/// ```rust
/// use serde_mapper::{to_writer, Annotation, Instance, Registry, SerializeOptions};
///
/// Registry::global().annotate_property("Point", "x", Annotation::property())?;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Instance::new("Point").with("x", 1), &SerializeOptions::new())?;
/// assert_eq!(buffer, br#"{"x":1}"#);
/// # Ok::<(), serde_mapper::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if mapping fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, instance: &Instance, options: &SerializeOptions) -> Result<()>
where
    W: io::Write,
{
    ObjectMapper::global().write(writer, instance, options)
}

/// Deserialize a document tree into an instance using the global registry.
///
/// # Errors
///
/// Structural, required-value and conversion errors.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_document(node: &Node, options: &DeserializeOptions) -> Result<Instance> {
    ObjectMapper::global().deserialize(node, options)
}

/// Deserialize JSON text into an instance of `class`.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or does not map onto `class`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str, class: &str) -> Result<Instance> {
    from_str_with_options(s, &DeserializeOptions::new(class))
}

/// Deserialize JSON text with per-call options.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or does not map onto
/// `options.main_class`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: &DeserializeOptions) -> Result<Instance> {
    ObjectMapper::global().parse(s, options)
}

/// Deserialize JSON bytes into an instance of `class`.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON or do not map onto `class`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(bytes: &[u8], class: &str) -> Result<Instance> {
    ObjectMapper::global().parse_slice(bytes, &DeserializeOptions::new(class))
}

/// Deserialize JSON from a reader into an instance of `class`.
///
/// # Examples
///
/// ```rust
/// use serde_mapper::{from_reader, Annotation, Registry, Value};
/// use std::io::Cursor;
///
/// Registry::global().annotate_property("Point", "x", Annotation::property())?;
///
/// let point = from_reader(Cursor::new(br#"{"x":1}"#), "Point")?;
/// assert_eq!(point.get("x"), Some(&Value::from(1)));
/// # Ok::<(), serde_mapper::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid JSON, or it does not map
/// onto `class`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(reader: R, class: &str) -> Result<Instance>
where
    R: io::Read,
{
    ObjectMapper::global().read(reader, &DeserializeOptions::new(class))
}
