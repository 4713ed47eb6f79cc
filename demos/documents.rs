//! Working with document trees directly, without the text step.
//!
//! Run with: cargo run --example documents

use serde_mapper::{
    from_document, node, to_document, Annotation, ClassDef, DeserializeOptions, Inclusion,
    Instance, Node, Registry, SerializeOptions, TypeDescriptor,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let registry = Registry::global();
    registry
        .define_class(ClassDef::new("Settings").default_value("retries", 3))?
        .annotate_class("Settings", Annotation::include(Inclusion::NonDefault))?
        .annotate_property("Settings", "retries", Annotation::property())?
        .annotate_property("Settings", "retries", Annotation::class_type(TypeDescriptor::Integer))?
        .annotate_property("Settings", "hosts", Annotation::property())?
        .annotate_property(
            "Settings",
            "hosts",
            Annotation::class_type(TypeDescriptor::list(TypeDescriptor::String)),
        )?;

    let document = node!({"hosts": ["a.example", "b.example"]});
    let settings = from_document(&document, &DeserializeOptions::new("Settings"))?;
    println!("Parsed: {:?}", settings);

    // `retries` still holds its constructor default, so NonDefault leaves it out.
    let written: Node = to_document(&settings, &SerializeOptions::new())?;
    println!("Written back: {}", written);
    assert_eq!(written, document);

    let changed: Instance = settings.with("retries", 5);
    println!("Changed: {}", to_document(&changed, &SerializeOptions::new())?);

    Ok(())
}
