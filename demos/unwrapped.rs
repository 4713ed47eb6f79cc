//! Flattening nested objects into their parent, plus root wrapping.
//!
//! Run with: cargo run --example unwrapped

use serde_mapper::{
    Annotation, DeserializeOptions, Instance, ObjectMapper, Registry, SerializeOptions,
    TypeDescriptor, UnwrapOptions,
};
use std::error::Error;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    let registry = Arc::new(Registry::new());
    registry
        .annotate_class("User", Annotation::root_name_value("user"))?
        .annotate_property("User", "id", Annotation::property())?
        .annotate_property("User", "name", Annotation::property())?
        .annotate_property("User", "name", Annotation::class_type(TypeDescriptor::class("Name")))?
        .annotate_property(
            "User",
            "name",
            Annotation::unwrapped_with(UnwrapOptions::new().prefix("name-").suffix("-value")),
        )?
        .annotate_property("Name", "first", Annotation::property())?
        .annotate_property("Name", "last", Annotation::property())?;
    let mapper = ObjectMapper::new(registry);

    let user = Instance::new("User").with("id", 1).with(
        "name",
        Instance::new("Name").with("first", "John").with("last", "Alfa"),
    );

    let json = mapper.stringify(&user, &SerializeOptions::pretty())?;
    println!("Flattened:\n{}\n", json);

    let back = mapper.parse(&json, &DeserializeOptions::new("User"))?;
    assert_eq!(back, user);
    println!("✓ Nested instance rebuilt: {:?}", back.get("name"));

    let plan = mapper.plan("User")?;
    println!("Plan of {}: {:?}", plan.class(), plan.wire_names());

    Ok(())
}
