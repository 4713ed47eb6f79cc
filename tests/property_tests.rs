//! Property-based tests for the mapping guarantees: round-trip identity, unwrap
//! reversibility and the write-only nature of virtual attributes.

use proptest::prelude::*;
use serde_mapper::{
    Annotation, AppendAttribute, AppendOptions, DeserializeOptions, Instance, ObjectMapper,
    Position, Registry, SerializeOptions, TypeDescriptor, UnwrapOptions, Value,
};
use std::sync::Arc;

fn property(registry: &Registry, class: &str, member: &str, ty: TypeDescriptor) {
    registry
        .annotate_property(class, member, Annotation::property())
        .unwrap()
        .annotate_property(class, member, Annotation::class_type(ty))
        .unwrap();
}

fn record_mapper() -> ObjectMapper {
    let registry = Arc::new(Registry::new());
    property(&registry, "Record", "id", TypeDescriptor::Integer);
    property(&registry, "Record", "name", TypeDescriptor::String);
    property(&registry, "Record", "score", TypeDescriptor::Number);
    property(&registry, "Record", "active", TypeDescriptor::Bool);
    property(&registry, "Record", "tags", TypeDescriptor::list(TypeDescriptor::String));
    ObjectMapper::new(registry)
}

fn record(id: i64, name: String, score: f64, active: bool, tags: Vec<String>) -> Instance {
    Instance::new("Record")
        .with("id", id)
        .with("name", name)
        .with("score", score)
        .with("active", active)
        .with("tags", Value::List(tags.into_iter().map(Value::from).collect()))
}

fn roundtrip(mapper: &ObjectMapper, instance: &Instance) -> bool {
    match mapper.stringify(instance, &SerializeOptions::new()) {
        Ok(json) => match mapper.parse(&json, &DeserializeOptions::new(instance.class())) {
            Ok(back) => back == *instance,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", json);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

#[test]
fn test_float_score_survives_text() {
    let mapper = record_mapper();
    for score in [135357991170.38101, 0.1 + 0.2, -2.2250738585072014e-308, 1e-7] {
        let instance = record(1, "a".to_string(), score, false, Vec::new());
        assert!(roundtrip(&mapper, &instance), "score {} changed", score);
    }
}

proptest! {
    #[test]
    fn prop_record_roundtrip(
        id in any::<i64>(),
        name in ".*",
        score in -1.0e12f64..1.0e12,
        active in any::<bool>(),
        tags in prop::collection::vec("[a-z]{0,8}", 0..5),
    ) {
        let mapper = record_mapper();
        prop_assert!(roundtrip(&mapper, &record(id, name, score, active, tags)));
    }

    #[test]
    fn prop_partial_record_roundtrip(id in any::<i64>(), with_name in any::<bool>()) {
        let mapper = record_mapper();
        let mut instance = Instance::new("Record").with("id", id);
        if with_name {
            instance.set("name", Value::Null);
        }
        prop_assert!(roundtrip(&mapper, &instance));
    }

    #[test]
    fn prop_unwrap_prefix_suffix_roundtrip(
        prefix in "[a-z]{0,4}_?",
        suffix in "(_[a-z]{0,4})?",
        first in "[A-Za-z ]{0,12}",
        last in "[A-Za-z ]{0,12}",
    ) {
        let registry = Arc::new(Registry::new());
        property(&registry, "Name", "first", TypeDescriptor::String);
        property(&registry, "Name", "last", TypeDescriptor::String);
        property(&registry, "User", "name", TypeDescriptor::class("Name"));
        registry
            .annotate_property(
                "User",
                "name",
                Annotation::unwrapped_with(
                    UnwrapOptions::new().prefix(prefix.clone()).suffix(suffix.clone()),
                ),
            )
            .unwrap();
        let mapper = ObjectMapper::new(registry);

        let user = Instance::new("User").with(
            "name",
            Instance::new("Name").with("first", first).with("last", last),
        );
        let document = mapper.serialize(&user, &SerializeOptions::new()).unwrap();
        let keys: Vec<String> = document
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        prop_assert_eq!(
            keys,
            vec![format!("{}first{}", prefix, suffix), format!("{}last{}", prefix, suffix)]
        );

        let back = mapper.deserialize(&document, &DeserializeOptions::new("User")).unwrap();
        prop_assert_eq!(back, user);
    }

    #[test]
    fn prop_virtual_attributes_never_deserialize(
        version in any::<i32>(),
        prepend in any::<bool>(),
        required in any::<bool>(),
    ) {
        let registry = Arc::new(Registry::new());
        let position = if prepend { Position::Prepend } else { Position::Append };
        registry
            .annotate_class(
                "User",
                Annotation::append(AppendOptions::new().attr(
                    AppendAttribute::new("version").required(required).position(position),
                )),
            )
            .unwrap();
        property(&registry, "User", "id", TypeDescriptor::Integer);
        property(&registry, "User", "email", TypeDescriptor::String);
        let mapper = ObjectMapper::new(registry);

        let user = Instance::new("User").with("id", 1).with("email", "a@b.c");
        let options = SerializeOptions::new().with_attribute("version", version);
        let document = mapper.serialize(&user, &options).unwrap();

        let first_key = document
            .as_object()
            .and_then(|map| map.keys().next().cloned());
        let expected_first = if prepend { "version" } else { "id" };
        prop_assert_eq!(first_key.as_deref(), Some(expected_first));

        let back = mapper.deserialize(&document, &DeserializeOptions::new("User")).unwrap();
        prop_assert!(!back.has("version"));
        prop_assert_eq!(back, user);
    }
}
