//! Serialize engine.
//!
//! Walks an [`Instance`] against the resolved plan of its class and produces a [`Node`].
//!
//! For every entry of the plan, in plan order:
//!
//! - a member property is read through its accessor (following the path of nested
//!   instances for properties flattened out of an unwrapped member), filtered by its
//!   inclusion policy and converted according to its declared type
//! - a virtual attribute is looked up in the caller's attribute map, filtered by its
//!   inclusion policy and emitted as is
//!
//! Absent members are skipped. The source instance is never mutated.
//!
//! ## Usage
//!
//! Most users go through [`ObjectMapper`](crate::ObjectMapper) or the crate-root
//! functions. The serializer can be used directly with an explicit registry:
//!
//! ```rust
//! use serde_mapper::{node, Annotation, Instance, Registry, SerializeOptions, Serializer};
//!
//! let registry = Registry::new();
//! registry.annotate_property("User", "id", Annotation::property())?;
//!
//! let options = SerializeOptions::new();
//! let user = Instance::new("User").with("id", 1);
//! let document = Serializer::new(&registry, &options).serialize(&user)?;
//! assert_eq!(document, node!({"id": 1}));
//! # Ok::<(), serde_mapper::Error>(())
//! ```

use crate::plan::{PlanEntry, PropertySpec, ReadAccess, VirtualAttributeSpec};
use crate::{
    Error, Inclusion, Instance, Node, NodeMap, Number, Registry, Result, SerializeOptions,
    TypeDescriptor, Value,
};
use chrono::SecondsFormat;
use num_bigint::BigInt;
use std::borrow::Cow;

/// The serialize engine, bound to a registry and the options of one call.
pub struct Serializer<'a> {
    registry: &'a Registry,
    options: &'a SerializeOptions,
}

impl<'a> Serializer<'a> {
    pub fn new(registry: &'a Registry, options: &'a SerializeOptions) -> Self {
        Serializer { registry, options }
    }

    /// Serializes a root instance, applying the root wrapper when enabled.
    ///
    /// # Errors
    ///
    /// Configuration errors from resolving the plans involved, required-value errors for
    /// missing required properties or attributes, and conversion errors.
    pub fn serialize(&self, instance: &Instance) -> Result<Node> {
        let plan = self.registry.resolve(instance.class())?;
        tracing::trace!(class = instance.class(), "serializing instance");
        let body = Node::Object(self.serialize_instance(instance)?);

        let root = plan.root();
        if root.enabled || self.options.wrap_root_value {
            let mut wrapper = NodeMap::with_capacity(1);
            wrapper.insert(root.wrapper_name.clone(), body);
            return Ok(Node::Object(wrapper));
        }
        Ok(body)
    }

    /// Serializes an instance with the plan of its own class, without root wrapping.
    pub fn serialize_instance(&self, instance: &Instance) -> Result<NodeMap> {
        let plan = self.registry.resolve(instance.class())?;
        let mut out = NodeMap::with_capacity(plan.entries().len());

        for entry in plan.entries() {
            match entry {
                PlanEntry::Property(spec) => self.write_property(instance, spec, &mut out)?,
                PlanEntry::Virtual(spec) => self.write_virtual(instance, spec, &mut out)?,
            }
        }
        Ok(out)
    }

    fn write_property(
        &self,
        instance: &Instance,
        spec: &PropertySpec,
        out: &mut NodeMap,
    ) -> Result<()> {
        if spec.is_flattened() && spec.path.is_empty() {
            return Ok(());
        }
        let label = member_label(instance.class(), &spec.member);
        let value = match owner(instance, &spec.path, &label)? {
            Some(owner) => spec.read.as_ref().and_then(|read| read.read(&owner)),
            None => None,
        };

        let Some(value) = value else {
            if spec.required {
                return Err(Error::required_value(instance.class(), &spec.wire_name));
            }
            return Ok(());
        };

        if included(spec.inclusion, &value, spec.default.as_ref(), &spec.value_type) {
            let node = self.to_node(&value, &spec.value_type, &label)?;
            out.insert(spec.wire_name.clone(), node);
        }
        Ok(())
    }

    fn write_virtual(
        &self,
        instance: &Instance,
        spec: &VirtualAttributeSpec,
        out: &mut NodeMap,
    ) -> Result<()> {
        let Some(value) = self.options.attributes.get(&spec.source_key) else {
            if spec.required {
                return Err(Error::required_value(instance.class(), &spec.source_key));
            }
            return Ok(());
        };

        if included(spec.inclusion, value, None, &TypeDescriptor::Any) {
            let label = member_label(instance.class(), &spec.wire_name);
            let node = self.to_node(value, &TypeDescriptor::Any, &label)?;
            out.insert(spec.wire_name.clone(), node);
        }
        Ok(())
    }

    /// Converts a member value to a document node according to its declared type.
    pub fn to_node(&self, value: &Value, ty: &TypeDescriptor, label: &str) -> Result<Node> {
        let mismatch = || Error::conversion(label, &ty.to_string(), value.kind());

        match (ty, value) {
            (_, Value::Null) => Ok(Node::Null),

            (TypeDescriptor::Bool | TypeDescriptor::Any, Value::Bool(b)) => Ok(Node::Bool(*b)),

            (TypeDescriptor::Number | TypeDescriptor::Any, Value::Number(n))
                if !n.as_f64().is_finite() =>
            {
                Err(Error::conversion(label, "finite number", &n.to_string()))
            }
            (TypeDescriptor::Number | TypeDescriptor::Any, Value::Number(n)) => {
                Ok(Node::Number(n.clone()))
            }
            (TypeDescriptor::Integer, Value::Number(n)) => n
                .as_i64()
                .map(|i| Node::Number(Number::Integer(i)))
                .ok_or_else(mismatch),

            (TypeDescriptor::String | TypeDescriptor::Any, Value::String(s)) => {
                Ok(Node::String(s.clone()))
            }

            (TypeDescriptor::Date | TypeDescriptor::Any, Value::Date(date)) => Ok(Node::String(
                date.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),

            (TypeDescriptor::BigInt | TypeDescriptor::Any, Value::BigInt(big)) => {
                Ok(bigint_to_node(big))
            }
            (TypeDescriptor::BigInt, Value::Number(n)) => n
                .as_i64()
                .map(|i| Node::Number(Number::Integer(i)))
                .ok_or_else(mismatch),

            (TypeDescriptor::List(element), Value::List(items)) => items
                .iter()
                .map(|item| self.to_node(item, element, label))
                .collect::<Result<Vec<_>>>()
                .map(Node::Array),
            (TypeDescriptor::Any, Value::List(items)) => items
                .iter()
                .map(|item| self.to_node(item, &TypeDescriptor::Any, label))
                .collect::<Result<Vec<_>>>()
                .map(Node::Array),

            (TypeDescriptor::Map(element), Value::Map(entries)) => entries
                .iter()
                .map(|(key, item)| -> Result<(String, Node)> {
                    Ok((key.clone(), self.to_node(item, element, label)?))
                })
                .collect::<Result<NodeMap>>()
                .map(Node::Object),
            (TypeDescriptor::Any, Value::Map(entries)) => entries
                .iter()
                .map(|(key, item)| -> Result<(String, Node)> {
                    Ok((key.clone(), self.to_node(item, &TypeDescriptor::Any, label)?))
                })
                .collect::<Result<NodeMap>>()
                .map(Node::Object),

            (TypeDescriptor::Class(class), Value::Object(nested)) => {
                if !self.registry.is_assignable(nested.class(), class) {
                    return Err(Error::conversion(label, class, nested.class()));
                }
                self.serialize_instance(nested).map(Node::Object)
            }
            (TypeDescriptor::Any, Value::Object(nested)) => {
                self.serialize_instance(nested).map(Node::Object)
            }

            _ => Err(mismatch()),
        }
    }
}

/// Follows `path` from `root` to the instance that owns a flattened value. `None` when
/// an instance along the way is absent or null.
fn owner<'i>(
    root: &'i Instance,
    path: &[ReadAccess],
    label: &str,
) -> Result<Option<Cow<'i, Instance>>> {
    let mut current = Cow::Borrowed(root);
    for step in path {
        current = match (step, current) {
            (ReadAccess::Field(name), Cow::Borrowed(instance)) => match instance.get(name) {
                Some(Value::Object(nested)) => Cow::Borrowed(&**nested),
                None | Some(Value::Null) => return Ok(None),
                Some(other) => return Err(Error::conversion(label, "object", other.kind())),
            },
            (step, current) => match step.read(&current) {
                Some(Value::Object(nested)) => Cow::Owned(*nested),
                None | Some(Value::Null) => return Ok(None),
                Some(other) => return Err(Error::conversion(label, "object", other.kind())),
            },
        };
    }
    Ok(Some(current))
}

fn member_label(class: &str, member: &str) -> String {
    format!("{}.{}", class, member)
}

fn bigint_to_node(big: &BigInt) -> Node {
    match i64::try_from(big) {
        Ok(i) => Node::Number(Number::Integer(i)),
        Err(_) => Node::String(big.to_string()),
    }
}

/// Whether a present value passes an inclusion policy.
pub(crate) fn included(
    inclusion: Inclusion,
    value: &Value,
    default: Option<&Value>,
    ty: &TypeDescriptor,
) -> bool {
    match inclusion {
        Inclusion::Always => true,
        Inclusion::NonNull => !value.is_null(),
        Inclusion::NonEmpty => !value.is_empty(),
        Inclusion::NonDefault => {
            if value.is_null() {
                return false;
            }
            match default {
                Some(default) => !same_value(value, default),
                None => type_default(ty).map_or(true, |default| !same_value(value, &default)),
            }
        }
    }
}

/// Default value of a declared type, as seen by [`Inclusion::NonDefault`].
fn type_default(ty: &TypeDescriptor) -> Option<Value> {
    match ty {
        TypeDescriptor::Bool => Some(Value::Bool(false)),
        TypeDescriptor::Number | TypeDescriptor::Integer => Some(Value::from(0)),
        TypeDescriptor::String => Some(Value::from("")),
        TypeDescriptor::BigInt => Some(Value::BigInt(BigInt::from(0))),
        TypeDescriptor::List(_) => Some(Value::List(Vec::new())),
        TypeDescriptor::Map(_) => Some(Value::Map(Default::default())),
        TypeDescriptor::Any | TypeDescriptor::Date | TypeDescriptor::Class(_) => None,
    }
}

// Numbers compare by magnitude so that `0` and `0.0` are the same default.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::BigInt(x), Value::Number(y)) | (Value::Number(y), Value::BigInt(x)) => {
            y.as_i64().is_some_and(|y| *x == BigInt::from(y))
        }
        _ => a == b,
    }
}
