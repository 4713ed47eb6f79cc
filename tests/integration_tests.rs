use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use serde_mapper::{
    node, Annotation, ClassDef, DeserializeOptions, Error, IgnorePropertiesOptions, Inclusion,
    Instance, ObjectMapper, PropertyOptions, PropertyOrderOptions, Registry, SerializeOptions,
    TypeDescriptor, Value,
};
use std::sync::Arc;

fn property(registry: &Registry, class: &str, member: &str, ty: TypeDescriptor) {
    registry
        .annotate_property(class, member, Annotation::property())
        .unwrap()
        .annotate_property(class, member, Annotation::class_type(ty))
        .unwrap();
}

fn user_registry() -> Arc<Registry> {
    let registry = Arc::new(Registry::new());
    property(&registry, "User", "id", TypeDescriptor::Integer);
    property(&registry, "User", "email", TypeDescriptor::String);
    registry
}

#[test]
fn test_simple_round_trip() {
    let mapper = ObjectMapper::new(user_registry());
    let user = Instance::new("User")
        .with("id", 1)
        .with("email", "john.alfa@gmail.com");

    let json = mapper.stringify(&user, &SerializeOptions::new()).unwrap();
    println!("User JSON: {}", json);
    assert_eq!(json, r#"{"id":1,"email":"john.alfa@gmail.com"}"#);

    let back = mapper.parse(&json, &DeserializeOptions::new("User")).unwrap();
    assert_eq!(back, user);
}

#[test]
fn test_output_follows_plan_order_not_instance_order() {
    let mapper = ObjectMapper::new(user_registry());
    let user = Instance::new("User")
        .with("email", "a@b.c")
        .with("id", 2)
        .with("internal", true);
    let json = mapper.stringify(&user, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"id":2,"email":"a@b.c"}"#);
}

#[test]
fn test_root_name_from_class() {
    let registry = user_registry();
    registry
        .annotate_class("User", Annotation::root_name())
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let user = Instance::new("User").with("id", 1);
    let document = mapper.serialize(&user, &SerializeOptions::new()).unwrap();
    assert_eq!(document, node!({"User": {"id": 1}}));

    let back = mapper
        .deserialize(&document, &DeserializeOptions::new("User"))
        .unwrap();
    assert_eq!(back, user);

    let err = mapper
        .deserialize(&node!({"id": 1}), &DeserializeOptions::new("User"))
        .unwrap_err();
    assert!(matches!(err, Error::RootWrapper { .. }));
    assert!(err.is_structural());
}

#[test]
fn test_root_name_with_value() {
    let registry = user_registry();
    registry
        .annotate_class("User", Annotation::root_name_value("account"))
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let json = mapper
        .stringify(&Instance::new("User").with("id", 5), &SerializeOptions::new())
        .unwrap();
    assert_eq!(json, r#"{"account":{"id":5}}"#);
    assert!(mapper.parse(&json, &DeserializeOptions::new("User")).is_ok());
    assert!(mapper
        .parse(r#"{"User":{"id":5}}"#, &DeserializeOptions::new("User"))
        .is_err());
}

#[test]
fn test_wrap_root_value_option() {
    let mapper = ObjectMapper::new(user_registry());
    let user = Instance::new("User").with("id", 1);

    let options = SerializeOptions::new().with_wrap_root_value(true);
    let json = mapper.stringify(&user, &options).unwrap();
    assert_eq!(json, r#"{"User":{"id":1}}"#);

    let options = DeserializeOptions::new("User").with_unwrap_root_value(true);
    assert_eq!(mapper.parse(&json, &options).unwrap(), user);
}

#[test]
fn test_nested_objects_are_not_root_wrapped() {
    let registry = user_registry();
    registry
        .annotate_class("User", Annotation::root_name())
        .unwrap();
    property(&registry, "Team", "lead", TypeDescriptor::class("User"));
    let mapper = ObjectMapper::new(registry);

    let team = Instance::new("Team").with("lead", Instance::new("User").with("id", 1));
    let document = mapper.serialize(&team, &SerializeOptions::new()).unwrap();
    assert_eq!(document, node!({"lead": {"id": 1}}));
}

#[test]
fn test_inherited_configuration() {
    let registry = Arc::new(Registry::new());
    registry
        .define_class(ClassDef::new("Entity").default_value("version", 1))
        .unwrap()
        .define_class(ClassDef::new("Customer").extends("Entity"))
        .unwrap();
    property(&registry, "Entity", "id", TypeDescriptor::Integer);
    property(&registry, "Entity", "version", TypeDescriptor::Integer);
    property(&registry, "Customer", "name", TypeDescriptor::String);
    registry
        .annotate_property(
            "Customer",
            "id",
            Annotation::property_with(PropertyOptions::new().name("customerId")),
        )
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let customer = Instance::new("Customer")
        .with("id", 9)
        .with("version", 3)
        .with("name", "Ann");
    let json = mapper.stringify(&customer, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"customerId":9,"version":3,"name":"Ann"}"#);

    let back = mapper
        .parse(r#"{"customerId":9,"name":"Ann"}"#, &DeserializeOptions::new("Customer"))
        .unwrap();
    assert_eq!(back.get("id"), Some(&Value::from(9)));
    assert_eq!(back.get("version"), Some(&Value::from(1)));

    let entity = Instance::new("Entity").with("id", 9);
    let json = mapper.stringify(&entity, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"id":9}"#);
}

#[test]
fn test_polymorphic_class_member() {
    let registry = Arc::new(Registry::new());
    registry
        .define_class(ClassDef::new("Animal"))
        .unwrap()
        .define_class(ClassDef::new("Dog").extends("Animal"))
        .unwrap();
    property(&registry, "Animal", "name", TypeDescriptor::String);
    property(&registry, "Dog", "breed", TypeDescriptor::String);
    property(&registry, "Owner", "pet", TypeDescriptor::class("Animal"));
    let mapper = ObjectMapper::new(registry);

    let owner = Instance::new("Owner").with(
        "pet",
        Instance::new("Dog").with("name", "Rex").with("breed", "collie"),
    );
    let document = mapper.serialize(&owner, &SerializeOptions::new()).unwrap();
    assert_eq!(document, node!({"pet": {"name": "Rex", "breed": "collie"}}));
}

#[test]
fn test_class_level_non_empty() {
    let registry = Arc::new(Registry::new());
    registry
        .annotate_class("Profile", Annotation::include(Inclusion::NonEmpty))
        .unwrap();
    property(&registry, "Profile", "nick", TypeDescriptor::String);
    property(&registry, "Profile", "tags", TypeDescriptor::list(TypeDescriptor::String));
    property(&registry, "Profile", "bio", TypeDescriptor::String);
    registry
        .annotate_property("Profile", "bio", Annotation::include(Inclusion::Always))
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let profile = Instance::new("Profile")
        .with("nick", "")
        .with("tags", Value::List(vec![]))
        .with("bio", "");
    let json = mapper.stringify(&profile, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"bio":""}"#);

    let profile = profile.with("tags", Value::List(vec![Value::from("rust")]));
    let json = mapper.stringify(&profile, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"tags":["rust"],"bio":""}"#);
}

#[test]
fn test_non_null_member() {
    let registry = user_registry();
    registry
        .annotate_property("User", "email", Annotation::include(Inclusion::NonNull))
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let user = Instance::new("User").with("id", 1).with("email", Value::Null);
    let json = mapper.stringify(&user, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"id":1}"#);
}

#[test]
fn test_required_property() {
    let registry = Arc::new(Registry::new());
    registry
        .annotate_property(
            "User",
            "id",
            Annotation::property_with(PropertyOptions::new().required(true)),
        )
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let err = mapper
        .stringify(&Instance::new("User"), &SerializeOptions::new())
        .unwrap_err();
    assert!(err.is_required_value());

    let err = mapper
        .parse("{}", &DeserializeOptions::new("User"))
        .unwrap_err();
    assert!(matches!(err, Error::RequiredValue { ref key, .. } if key == "id"));

    assert!(mapper
        .parse(r#"{"id":null}"#, &DeserializeOptions::new("User"))
        .is_ok());
}

#[test]
fn test_getter_and_setter_methods() {
    let registry = Arc::new(Registry::new());
    registry
        .annotate_method(
            "Temperature",
            "getCelsius",
            Annotation::getter(|t| {
                let kelvin = t.get("kelvin")?.as_i64()?;
                Some(Value::from(kelvin - 273))
            }),
        )
        .unwrap()
        .annotate_method(
            "Temperature",
            "getCelsius",
            Annotation::class_type(TypeDescriptor::Integer),
        )
        .unwrap()
        .annotate_method(
            "Temperature",
            "setCelsius",
            Annotation::setter(|t, v| {
                if let Some(celsius) = v.as_i64() {
                    t.set("kelvin", celsius + 273);
                }
            }),
        )
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let reading = Instance::new("Temperature").with("kelvin", 300);
    let json = mapper.stringify(&reading, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"celsius":27}"#);

    let back = mapper
        .parse(r#"{"celsius":-10}"#, &DeserializeOptions::new("Temperature"))
        .unwrap();
    assert_eq!(back.get("kelvin"), Some(&Value::from(263)));
}

#[test]
fn test_renamed_getter() {
    let registry = Arc::new(Registry::new());
    registry
        .annotate_method(
            "User",
            "fullName",
            Annotation::getter(|u| u.get("name").cloned()).named("display_name"),
        )
        .unwrap();
    let mapper = ObjectMapper::new(registry);
    let json = mapper
        .stringify(&Instance::new("User").with("name", "Ann"), &SerializeOptions::new())
        .unwrap();
    assert_eq!(json, r#"{"display_name":"Ann"}"#);
}

#[test]
fn test_property_order() {
    let registry = user_registry();
    property(&registry, "User", "active", TypeDescriptor::Bool);
    registry
        .annotate_class("User", Annotation::property_order(["active"]))
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let user = Instance::new("User")
        .with("id", 1)
        .with("email", "a@b.c")
        .with("active", true);
    let json = mapper.stringify(&user, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"active":true,"id":1,"email":"a@b.c"}"#);
}

#[test]
fn test_alphabetic_property_order() {
    let registry = user_registry();
    property(&registry, "User", "active", TypeDescriptor::Bool);
    registry
        .annotate_class(
            "User",
            Annotation::PropertyOrder(PropertyOrderOptions {
                order: vec![],
                alphabetic: true,
            }),
        )
        .unwrap();
    let plan = registry.resolve("User").unwrap();
    assert_eq!(plan.wire_names(), vec!["active", "email", "id"]);
}

#[test]
fn test_ignored_member() {
    let registry = user_registry();
    property(&registry, "User", "password", TypeDescriptor::String);
    registry
        .annotate_property("User", "password", Annotation::ignore())
        .unwrap();
    let mapper = ObjectMapper::new(registry);

    let user = Instance::new("User").with("id", 1).with("password", "hunter2");
    let json = mapper.stringify(&user, &SerializeOptions::new()).unwrap();
    assert_eq!(json, r#"{"id":1}"#);

    let back = mapper
        .parse(r#"{"id":1,"password":"x"}"#, &DeserializeOptions::new("User"))
        .unwrap();
    assert!(!back.has("password"));
}

#[test]
fn test_ignore_properties_names() {
    let registry = user_registry();
    registry
        .annotate_class(
            "User",
            Annotation::ignore_properties(IgnorePropertiesOptions {
                names: vec!["_links".to_string()],
                ignore_unknown: false,
            }),
        )
        .unwrap();
    let mapper = ObjectMapper::new(registry);
    let strict = DeserializeOptions::new("User").with_fail_on_unknown_properties(true);

    assert!(mapper.parse(r#"{"id":1,"_links":{}}"#, &strict).is_ok());
    let err = mapper.parse(r#"{"id":1,"extra":0}"#, &strict).unwrap_err();
    assert!(matches!(err, Error::UnknownProperty { ref key, .. } if key == "extra"));
}

#[test]
fn test_dates_and_big_integers_through_text() {
    let registry = Arc::new(Registry::new());
    property(&registry, "Ledger", "opened", TypeDescriptor::Date);
    property(&registry, "Ledger", "balance", TypeDescriptor::BigInt);
    property(&registry, "Ledger", "count", TypeDescriptor::BigInt);
    let mapper = ObjectMapper::new(registry);

    let balance: BigInt = "98765432109876543210".parse().unwrap();
    let ledger = Instance::new("Ledger")
        .with("opened", Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap())
        .with("balance", balance)
        .with("count", BigInt::from(12));

    let json = mapper.stringify(&ledger, &SerializeOptions::new()).unwrap();
    assert_eq!(
        json,
        r#"{"opened":"2023-06-01T12:00:00.000Z","balance":"98765432109876543210","count":12}"#
    );
    let back = mapper.parse(&json, &DeserializeOptions::new("Ledger")).unwrap();
    assert_eq!(back, ledger);
}

#[test]
fn test_lists_and_maps_of_classes() {
    let registry = Arc::new(Registry::new());
    property(&registry, "Line", "sku", TypeDescriptor::String);
    property(&registry, "Line", "qty", TypeDescriptor::Integer);
    property(
        &registry,
        "Order",
        "lines",
        TypeDescriptor::list(TypeDescriptor::class("Line")),
    );
    property(
        &registry,
        "Order",
        "notes",
        TypeDescriptor::map(TypeDescriptor::String),
    );
    let mapper = ObjectMapper::new(registry);

    let json = r#"{"lines":[{"sku":"A","qty":2},{"sku":"B","qty":1}],"notes":{"gift":"yes"}}"#;
    let order = mapper.parse(json, &DeserializeOptions::new("Order")).unwrap();
    match order.get("lines") {
        Some(Value::List(lines)) => {
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0].as_instance().map(Instance::class), Some("Line"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        mapper.stringify(&order, &SerializeOptions::new()).unwrap(),
        json
    );
}

#[test]
fn test_conversion_errors_both_directions() {
    let mapper = ObjectMapper::new(user_registry());

    let err = mapper
        .stringify(&Instance::new("User").with("id", 1.5), &SerializeOptions::new())
        .unwrap_err();
    assert!(err.is_conversion());

    let err = mapper
        .parse(r#"{"email":42}"#, &DeserializeOptions::new("User"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Conversion error at `User.email`: expected string, found number"
    );
}

#[test]
fn test_unknown_main_class() {
    let mapper = ObjectMapper::new(Arc::new(Registry::new()));
    let err = mapper
        .parse("{}", &DeserializeOptions::new("Ghost"))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownClass(ref class) if class == "Ghost"));
}

#[test]
fn test_concurrent_mapping() {
    let mapper = ObjectMapper::new(user_registry());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mapper = mapper.clone();
            std::thread::spawn(move || {
                let user = Instance::new("User").with("id", i);
                let json = mapper.stringify(&user, &SerializeOptions::new()).unwrap();
                mapper.parse(&json, &DeserializeOptions::new("User")).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let user = handle.join().unwrap();
        assert_eq!(user.get("id"), Some(&Value::from(i as i64)));
    }
}
