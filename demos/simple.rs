//! Basic mapping of an annotated class to JSON and back.
//!
//! Run with: cargo run --example simple

use serde_mapper::{
    from_str, to_string, to_string_pretty, Annotation, Instance, PropertyOptions, Registry,
    TypeDescriptor, Value,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let registry = Registry::global();
    registry
        .annotate_property("User", "id", Annotation::property())?
        .annotate_property("User", "id", Annotation::class_type(TypeDescriptor::Integer))?
        .annotate_property(
            "User",
            "name",
            Annotation::property_with(PropertyOptions::new().name("fullName")),
        )?
        .annotate_property("User", "name", Annotation::class_type(TypeDescriptor::String))?
        .annotate_property("User", "email", Annotation::property())?
        .annotate_property("User", "email", Annotation::class_type(TypeDescriptor::String))?;

    let user = Instance::new("User")
        .with("id", 42)
        .with("name", "Alice Johnson")
        .with("email", "alice@example.com");

    let json = to_string(&user)?;
    println!("JSON output:\n{}\n", json);
    println!("Pretty:\n{}\n", to_string_pretty(&user)?);

    let user_back = from_str(&json, "User")?;
    assert_eq!(user, user_back);
    assert_eq!(user_back.get("name"), Some(&Value::from("Alice Johnson")));
    println!("✓ Round-trip successful");

    Ok(())
}
