//! Virtual attributes: document fields sourced from per-call values.
//!
//! Run with: cargo run --example virtual_attributes

use serde_mapper::{
    Annotation, AppendAttribute, AppendOptions, Attributes, DeserializeOptions, Inclusion,
    Instance, ObjectMapper, Position, Registry, SerializeOptions, TypeDescriptor, Value,
};
use std::error::Error;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    let registry = Arc::new(Registry::new());
    registry
        .annotate_class(
            "User",
            Annotation::append(
                AppendOptions::new()
                    .attr(AppendAttribute::new("version").prop_name("apiVersion"))
                    .attr(AppendAttribute::new("requestId").position(Position::Prepend))
                    .attr(AppendAttribute::new("region").include(Inclusion::NonNull)),
            ),
        )?
        .annotate_property("User", "id", Annotation::property())?
        .annotate_property("User", "id", Annotation::class_type(TypeDescriptor::Number))?
        .annotate_property("User", "email", Annotation::property())?
        .annotate_property("User", "email", Annotation::class_type(TypeDescriptor::String))?;
    let mapper = ObjectMapper::new(registry);

    let user = Instance::new("User")
        .with("id", 1)
        .with("email", "john.alfa@gmail.com");
    let attributes = Attributes::new()
        .with("version", 1.2)
        .with("requestId", "req-7")
        .with("region", Value::Null);

    let json = mapper.stringify(&user, &SerializeOptions::new().with_attributes(attributes))?;
    println!("With attributes:\n{}\n", json);

    // Attributes are write-only: they never come back on the instance.
    let back = mapper.parse(&json, &DeserializeOptions::new("User"))?;
    assert_eq!(back, user);
    println!("✓ Parsed back without virtual attributes: {:?}", back);

    Ok(())
}
