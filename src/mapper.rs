//! Mapper entry points.
//!
//! An [`ObjectMapper`] composes the three stages of a mapping call: plan resolution
//! through its registry, the serialize or deserialize engine, and the JSON text codec.
//!
//! ```rust
//! use serde_mapper::{
//!     Annotation, AppendAttribute, AppendOptions, DeserializeOptions, Instance, ObjectMapper,
//!     Registry, SerializeOptions, TypeDescriptor,
//! };
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::new());
//! registry
//!     .annotate_class(
//!         "User",
//!         Annotation::append(AppendOptions::new().attr(AppendAttribute::new("version"))),
//!     )?
//!     .annotate_property("User", "id", Annotation::property())?
//!     .annotate_property("User", "id", Annotation::class_type(TypeDescriptor::Number))?;
//!
//! let mapper = ObjectMapper::new(registry);
//! let user = Instance::new("User").with("id", 1);
//! let text = mapper.stringify(&user, &SerializeOptions::new().with_attribute("version", 1.2))?;
//! assert_eq!(text, r#"{"id":1,"version":1.2}"#);
//!
//! let back = mapper.parse(&text, &DeserializeOptions::new("User"))?;
//! assert_eq!(back, user);
//! # Ok::<(), serde_mapper::Error>(())
//! ```

use crate::plan::ResolvedPlan;
use crate::{
    DeserializeOptions, Deserializer, Instance, Node, Registry, Result, SerializeOptions,
    Serializer,
};
use std::io;
use std::sync::Arc;

/// Maps instances to documents and back using the plans of one registry.
#[derive(Clone)]
pub struct ObjectMapper {
    registry: Arc<Registry>,
}

impl ObjectMapper {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        ObjectMapper { registry }
    }

    /// A mapper over the process-wide registry.
    #[must_use]
    pub fn global() -> Self {
        ObjectMapper::new(Registry::global())
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolved plan of `class`, resolving it on first use.
    pub fn plan(&self, class: &str) -> Result<Arc<ResolvedPlan>> {
        self.registry.resolve(class)
    }

    /// Instance to document tree.
    pub fn serialize(&self, instance: &Instance, options: &SerializeOptions) -> Result<Node> {
        Serializer::new(&self.registry, options).serialize(instance)
    }

    /// Document tree to an instance of `options.main_class`.
    pub fn deserialize(&self, node: &Node, options: &DeserializeOptions) -> Result<Instance> {
        Deserializer::new(&self.registry, options).deserialize(node)
    }

    /// Instance to JSON text.
    ///
    /// # Errors
    ///
    /// Any serialize error, or a codec error from the text encoder.
    pub fn stringify(&self, instance: &Instance, options: &SerializeOptions) -> Result<String> {
        let node = self.serialize(instance, options)?;
        let text = if options.pretty {
            serde_json::to_string_pretty(&node)?
        } else {
            serde_json::to_string(&node)?
        };
        Ok(text)
    }

    /// JSON text to an instance.
    ///
    /// # Errors
    ///
    /// A codec error for malformed text, or any deserialize error.
    pub fn parse(&self, text: &str, options: &DeserializeOptions) -> Result<Instance> {
        let node: Node = serde_json::from_str(text)?;
        self.deserialize(&node, options)
    }

    pub fn parse_slice(&self, bytes: &[u8], options: &DeserializeOptions) -> Result<Instance> {
        let node: Node = serde_json::from_slice(bytes)?;
        self.deserialize(&node, options)
    }

    pub fn write<W: io::Write>(
        &self,
        writer: W,
        instance: &Instance,
        options: &SerializeOptions,
    ) -> Result<()> {
        let node = self.serialize(instance, options)?;
        if options.pretty {
            serde_json::to_writer_pretty(writer, &node)?;
        } else {
            serde_json::to_writer(writer, &node)?;
        }
        Ok(())
    }

    pub fn read<R: io::Read>(&self, reader: R, options: &DeserializeOptions) -> Result<Instance> {
        let node: Node = serde_json::from_reader(reader)?;
        self.deserialize(&node, options)
    }
}

impl Default for ObjectMapper {
    fn default() -> Self {
        ObjectMapper::global()
    }
}

impl std::fmt::Debug for ObjectMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectMapper").finish_non_exhaustive()
    }
}
