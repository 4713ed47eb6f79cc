//! Deserialize engine.
//!
//! Reconstructs an [`Instance`] from a [`Node`] using the resolved plan of the target
//! class:
//!
//! 1. strip the root wrapper when the class declares one (or the call asks for it)
//! 2. construct the instance with the class's constructor defaults
//! 3. write every property whose wire name is present, converted to its declared type
//! 4. rebuild unwrapped members from the flattened keys, recursively
//!
//! Virtual attributes have no counterpart on the instance: a document key matching one is
//! skipped (or rejected with [`DeserializeOptions::fail_on_virtual_properties`]).
//!
//! ```rust
//! use serde_mapper::{node, Annotation, DeserializeOptions, Deserializer, Registry, Value};
//!
//! let registry = Registry::new();
//! registry.annotate_property("User", "id", Annotation::property())?;
//!
//! let options = DeserializeOptions::new("User");
//! let user = Deserializer::new(&registry, &options).deserialize(&node!({"id": 1}))?;
//! assert_eq!(user.get("id"), Some(&Value::from(1)));
//! # Ok::<(), serde_mapper::Error>(())
//! ```

use crate::plan::ResolvedPlan;
use crate::{
    DeserializeOptions, Error, Instance, Node, NodeMap, Number, Registry, Result,
    TypeDescriptor, Value,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;

/// The deserialize engine, bound to a registry and the options of one call.
pub struct Deserializer<'a> {
    registry: &'a Registry,
    options: &'a DeserializeOptions,
}

impl<'a> Deserializer<'a> {
    pub fn new(registry: &'a Registry, options: &'a DeserializeOptions) -> Self {
        Deserializer { registry, options }
    }

    /// Deserializes a root document into an instance of the options' main class.
    ///
    /// # Errors
    ///
    /// Configuration errors from resolving plans, structural errors (root wrapper
    /// mismatch, non-object document, rejected keys), required-value errors and
    /// conversion errors.
    pub fn deserialize(&self, node: &Node) -> Result<Instance> {
        let class = self.options.main_class.as_str();
        let plan = self.registry.resolve(class)?;
        tracing::trace!(class, "deserializing document");

        let root = plan.root();
        let body = if root.enabled || self.options.unwrap_root_value {
            unwrap_root(node, &root.wrapper_name)?
        } else {
            node
        };

        let object = body.as_object().ok_or_else(|| {
            Error::structural(format!(
                "expected an object for class `{}`, found {}",
                class,
                body.kind()
            ))
        })?;
        self.deserialize_object(&plan, object)
    }

    /// Builds an instance of the plan's class from an object node.
    pub fn deserialize_object(&self, plan: &ResolvedPlan, object: &NodeMap) -> Result<Instance> {
        self.check_keys(plan, object)?;
        let mut instance = self.registry.construct(plan.class())?;

        for spec in plan.properties().filter(|spec| !spec.is_flattened()) {
            match object.get(&spec.wire_name) {
                Some(node) => {
                    if let Some(write) = &spec.write {
                        let label = format!("{}.{}", plan.class(), spec.member);
                        let value = self.to_value(node, &spec.value_type, &label)?;
                        write.write(&mut instance, value);
                    }
                }
                None if spec.required => {
                    return Err(Error::required_value(plan.class(), &spec.wire_name));
                }
                None => {}
            }
        }

        for member in plan.unwrapped() {
            let synthetic: NodeMap = object
                .iter()
                .filter_map(|(key, node)| {
                    let inner = member.unwrap.reverse(key)?;
                    member
                        .plan
                        .property(inner)
                        .map(|_| (inner.to_string(), node.clone()))
                })
                .collect();
            if synthetic.is_empty() {
                continue;
            }
            let nested = self.deserialize_object(&member.plan, &synthetic)?;
            member.write.write(&mut instance, Value::from(nested));
        }

        Ok(instance)
    }

    fn check_keys(&self, plan: &ResolvedPlan, object: &NodeMap) -> Result<()> {
        for key in object.keys() {
            if plan.property(key).is_some() {
                continue;
            }
            if plan.is_virtual(key) || plan.is_ignored(key) {
                if self.options.fail_on_virtual_properties {
                    return Err(Error::unknown_property(plan.class(), key));
                }
                continue;
            }
            if self.options.fail_on_unknown_properties && !plan.ignores_unknown() {
                return Err(Error::unknown_property(plan.class(), key));
            }
        }
        Ok(())
    }

    /// Converts a document node to a member value according to its declared type.
    pub fn to_value(&self, node: &Node, ty: &TypeDescriptor, label: &str) -> Result<Value> {
        let mismatch = || Error::conversion(label, &ty.to_string(), node.kind());

        match (ty, node) {
            (_, Node::Null) => Ok(Value::Null),

            (TypeDescriptor::Bool | TypeDescriptor::Any, Node::Bool(b)) => Ok(Value::Bool(*b)),

            (TypeDescriptor::Number | TypeDescriptor::Any, Node::Number(n)) => {
                Ok(Value::Number(n.clone()))
            }
            (TypeDescriptor::Integer, Node::Number(n)) => n
                .as_i64()
                .map(|i| Value::Number(Number::Integer(i)))
                .ok_or_else(mismatch),

            (TypeDescriptor::String | TypeDescriptor::Any, Node::String(s)) => {
                Ok(Value::String(s.clone()))
            }

            (TypeDescriptor::Date, Node::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|date| Value::Date(date.with_timezone(&Utc)))
                .map_err(|_| Error::conversion(label, "date", "malformed date string")),
            (TypeDescriptor::Date, Node::Number(n)) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(Value::Date)
                .ok_or_else(mismatch),

            (TypeDescriptor::BigInt, Node::Number(n)) => n
                .as_i64()
                .map(|i| Value::BigInt(BigInt::from(i)))
                .ok_or_else(mismatch),
            (TypeDescriptor::BigInt, Node::String(s)) => s
                .parse::<BigInt>()
                .map(Value::BigInt)
                .map_err(|_| Error::conversion(label, "bigint", "malformed integer string")),

            (TypeDescriptor::List(element), Node::Array(items)) => items
                .iter()
                .map(|item| self.to_value(item, element, label))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (TypeDescriptor::Any, Node::Array(items)) => items
                .iter()
                .map(|item| self.to_value(item, &TypeDescriptor::Any, label))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),

            (TypeDescriptor::Map(element), Node::Object(entries)) => {
                self.to_map(entries, element, label)
            }
            (TypeDescriptor::Any, Node::Object(entries)) => {
                self.to_map(entries, &TypeDescriptor::Any, label)
            }

            (TypeDescriptor::Class(class), Node::Object(entries)) => {
                let plan = self.registry.resolve(class)?;
                self.deserialize_object(&plan, entries).map(Value::from)
            }

            _ => Err(mismatch()),
        }
    }

    fn to_map(&self, entries: &NodeMap, element: &TypeDescriptor, label: &str) -> Result<Value> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (key, item) in entries {
            map.insert(key.clone(), self.to_value(item, element, label)?);
        }
        Ok(Value::Map(map))
    }
}

fn unwrap_root<'n>(node: &'n Node, wrapper_name: &str) -> Result<&'n Node> {
    let found = match node {
        Node::Object(map) => match map.single_entry() {
            Some((key, inner)) if key == wrapper_name => return Ok(inner),
            Some((key, _)) => format!("key `{}`", key),
            None => format!("object with {} keys", map.len()),
        },
        other => other.kind().to_string(),
    };
    Err(Error::root_wrapper(wrapper_name, found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{node, Annotation, ClassDef, IgnorePropertiesOptions};

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .define_class(ClassDef::new("User").default_value("active", true))
            .unwrap()
            .annotate_property("User", "id", Annotation::property())
            .unwrap()
            .annotate_property("User", "id", Annotation::class_type(TypeDescriptor::Integer))
            .unwrap()
            .annotate_property("User", "email", Annotation::property())
            .unwrap()
            .annotate_property("User", "email", Annotation::class_type(TypeDescriptor::String))
            .unwrap();
        registry
    }

    #[test]
    fn test_missing_key_keeps_default() {
        let registry = registry();
        let options = DeserializeOptions::new("User");
        let user = Deserializer::new(&registry, &options)
            .deserialize(&node!({"id": 1}))
            .unwrap();
        assert_eq!(user.get("id"), Some(&Value::from(1)));
        assert_eq!(user.get("active"), Some(&Value::Bool(true)));
        assert!(!user.has("email"));
    }

    #[test]
    fn test_unknown_keys() {
        let registry = registry();
        let lenient = DeserializeOptions::new("User");
        let doc = node!({"id": 1, "nickname": "jj"});
        let user = Deserializer::new(&registry, &lenient).deserialize(&doc).unwrap();
        assert!(!user.has("nickname"));

        let strict = DeserializeOptions::new("User").with_fail_on_unknown_properties(true);
        let err = Deserializer::new(&registry, &strict)
            .deserialize(&doc)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { ref key, .. } if key == "nickname"));
    }

    #[test]
    fn test_class_level_ignore_unknown() {
        let registry = registry();
        registry
            .annotate_class(
                "User",
                Annotation::ignore_properties(IgnorePropertiesOptions {
                    names: vec!["legacy".to_string()],
                    ignore_unknown: true,
                }),
            )
            .unwrap();
        let strict = DeserializeOptions::new("User").with_fail_on_unknown_properties(true);
        let doc = node!({"id": 1, "legacy": 0, "nickname": "jj"});
        assert!(Deserializer::new(&registry, &strict).deserialize(&doc).is_ok());

        let virtuals = strict.with_fail_on_virtual_properties(true);
        assert!(Deserializer::new(&registry, &virtuals)
            .deserialize(&doc)
            .unwrap_err()
            .is_structural());
    }

    #[test]
    fn test_conversion_error_names_member() {
        let registry = registry();
        let options = DeserializeOptions::new("User");
        let err = Deserializer::new(&registry, &options)
            .deserialize(&node!({"id": "one"}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Conversion error at `User.id`: expected integer, found string"
        );
    }

    #[test]
    fn test_non_object_document() {
        let registry = registry();
        let options = DeserializeOptions::new("User");
        let err = Deserializer::new(&registry, &options)
            .deserialize(&node!([1, 2]))
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_unwrap_root_on_request() {
        let registry = registry();
        let options = DeserializeOptions::new("User").with_unwrap_root_value(true);
        let deserializer = Deserializer::new(&registry, &options);

        let user = deserializer
            .deserialize(&node!({"User": {"id": 3}}))
            .unwrap();
        assert_eq!(user.get("id"), Some(&Value::from(3)));

        let err = deserializer
            .deserialize(&node!({"Person": {"id": 3}}))
            .unwrap_err();
        assert!(matches!(err, Error::RootWrapper { ref found, .. } if found == "key `Person`"));
        assert!(deserializer
            .deserialize(&node!({"User": {}, "extra": 1}))
            .is_err());
    }

    #[test]
    fn test_date_and_bigint() {
        let registry = Registry::new();
        registry
            .annotate_property("Event", "at", Annotation::property())
            .unwrap()
            .annotate_property("Event", "at", Annotation::class_type(TypeDescriptor::Date))
            .unwrap()
            .annotate_property("Event", "large", Annotation::property())
            .unwrap()
            .annotate_property("Event", "large", Annotation::class_type(TypeDescriptor::BigInt))
            .unwrap();
        let options = DeserializeOptions::new("Event");
        let deserializer = Deserializer::new(&registry, &options);

        let event = deserializer
            .deserialize(&node!({
                "at": "2024-01-02T03:04:05.000Z",
                "large": "123456789012345678901234567890"
            }))
            .unwrap();
        let expected: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(event.get("large"), Some(&Value::BigInt(expected)));
        match event.get("at") {
            Some(Value::Date(date)) => assert_eq!(date.timestamp(), 1_704_164_645),
            other => panic!("unexpected {:?}", other),
        }

        let err = deserializer
            .deserialize(&node!({"at": "yesterday"}))
            .unwrap_err();
        assert!(err.is_conversion());
    }
}
