//! Configuration fragments attached to classes, properties and methods.
//!
//! An [`Annotation`] is the payload of one registration call. It carries one option
//! group (naming, type, inclusion, unwrapping, virtual attributes, ...). Annotations are
//! plain data; they only take effect when the resolver merges them into a plan.
//!
//! | Annotation | Valid on |
//! |---|---|
//! | [`Annotation::Property`] | property |
//! | [`Annotation::Getter`], [`Annotation::Setter`] | method |
//! | [`Annotation::ClassType`], [`Annotation::Unwrapped`], [`Annotation::Ignore`] | property, method |
//! | [`Annotation::Include`] | class, property, method |
//! | [`Annotation::Append`], [`Annotation::RootName`], [`Annotation::PropertyOrder`], [`Annotation::IgnoreProperties`] | class |
//!
//! ## Examples
//!
//! ```rust
//! use serde_mapper::{AppendAttribute, AppendOptions, Annotation, Inclusion};
//!
//! let append = Annotation::append(
//!     AppendOptions::new()
//!         .prepend(true)
//!         .attr(AppendAttribute::new("version").include(Inclusion::NonNull)),
//! );
//! assert!(matches!(append, Annotation::Append(_)));
//! ```

use crate::registry::MemberKind;
use crate::{Instance, TypeDescriptor, Value};
use std::fmt;
use std::sync::Arc;

/// Read accessor of a method member (a getter).
pub type ReadFn = Arc<dyn Fn(&Instance) -> Option<Value> + Send + Sync>;

/// Write accessor of a method member (a setter).
pub type WriteFn = Arc<dyn Fn(&mut Instance, Value) + Send + Sync>;

/// Rule deciding whether a value is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Inclusion {
    #[default]
    Always,
    /// Omit null (and absent) values.
    NonNull,
    /// Also omit empty strings, lists and maps.
    NonEmpty,
    /// Omit values equal to the member's default.
    NonDefault,
}

/// Where a virtual attribute goes relative to the member properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Position {
    Prepend,
    #[default]
    Append,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PropertyOptions {
    /// Explicit wire name; defaults to the member name.
    pub name: Option<String>,
    pub required: bool,
}

impl PropertyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Clone)]
pub struct GetterOptions {
    pub name: Option<String>,
    pub read: ReadFn,
}

impl fmt::Debug for GetterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetterOptions")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct SetterOptions {
    pub name: Option<String>,
    pub write: WriteFn,
}

impl fmt::Debug for SetterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetterOptions")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Flattening of a nested class into its parent's namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnwrapOptions {
    pub enabled: bool,
    pub prefix: String,
    pub suffix: String,
}

impl Default for UnwrapOptions {
    fn default() -> Self {
        UnwrapOptions {
            enabled: true,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl UnwrapOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// One virtual attribute: a document field sourced from the caller's attribute map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendAttribute {
    /// Key looked up in the attribute map.
    pub value: String,
    /// Wire name; defaults to `value`.
    pub prop_name: Option<String>,
    pub required: bool,
    pub include: Inclusion,
    pub position: Option<Position>,
}

impl AppendAttribute {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        AppendAttribute {
            value: value.into(),
            prop_name: None,
            required: false,
            include: Inclusion::Always,
            position: None,
        }
    }

    #[must_use]
    pub fn prop_name(mut self, name: impl Into<String>) -> Self {
        self.prop_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn include(mut self, include: Inclusion) -> Self {
        self.include = include;
        self
    }

    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Class-level virtual attribute declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendOptions {
    pub enabled: bool,
    /// Place every virtual attribute of the class before the member properties.
    pub prepend: bool,
    pub attrs: Vec<AppendAttribute>,
}

impl Default for AppendOptions {
    fn default() -> Self {
        AppendOptions {
            enabled: true,
            prepend: false,
            attrs: Vec::new(),
        }
    }
}

impl AppendOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prepend(mut self, prepend: bool) -> Self {
        self.prepend = prepend;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn attr(mut self, attr: AppendAttribute) -> Self {
        self.attrs.push(attr);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootNameOptions {
    pub enabled: bool,
    /// Wrapper name; defaults to the class name.
    pub value: Option<String>,
}

impl Default for RootNameOptions {
    fn default() -> Self {
        RootNameOptions {
            enabled: true,
            value: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PropertyOrderOptions {
    /// Wire names that go first, in this order.
    pub order: Vec<String>,
    /// Sort the remaining entries by wire name.
    pub alphabetic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IgnorePropertiesOptions {
    /// Document keys that are always skipped on read.
    pub names: Vec<String>,
    /// Tolerate unknown keys even when the caller asks to reject them.
    pub ignore_unknown: bool,
}

/// One unit of configuration for a class or a member.
#[derive(Clone, Debug)]
pub enum Annotation {
    Property(PropertyOptions),
    Getter(GetterOptions),
    Setter(SetterOptions),
    ClassType(TypeDescriptor),
    Include(Inclusion),
    Unwrapped(UnwrapOptions),
    Ignore,
    Append(AppendOptions),
    RootName(RootNameOptions),
    PropertyOrder(PropertyOrderOptions),
    IgnoreProperties(IgnorePropertiesOptions),
}

/// Merge key of an annotation: fragments with the same key override each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    Property,
    Getter,
    Setter,
    ClassType,
    Include,
    Unwrapped,
    Ignore,
    Append,
    RootName,
    PropertyOrder,
    IgnoreProperties,
}

impl Annotation {
    #[must_use]
    pub fn property() -> Self {
        Annotation::Property(PropertyOptions::new())
    }

    #[must_use]
    pub fn property_with(options: PropertyOptions) -> Self {
        Annotation::Property(options)
    }

    /// Marks a method as the read accessor of a property.
    #[must_use]
    pub fn getter<F>(read: F) -> Self
    where
        F: Fn(&Instance) -> Option<Value> + Send + Sync + 'static,
    {
        Annotation::Getter(GetterOptions {
            name: None,
            read: Arc::new(read),
        })
    }

    /// Marks a method as the write accessor of a property.
    #[must_use]
    pub fn setter<F>(write: F) -> Self
    where
        F: Fn(&mut Instance, Value) + Send + Sync + 'static,
    {
        Annotation::Setter(SetterOptions {
            name: None,
            write: Arc::new(write),
        })
    }

    #[must_use]
    pub fn class_type(ty: TypeDescriptor) -> Self {
        Annotation::ClassType(ty)
    }

    #[must_use]
    pub fn include(inclusion: Inclusion) -> Self {
        Annotation::Include(inclusion)
    }

    #[must_use]
    pub fn unwrapped() -> Self {
        Annotation::Unwrapped(UnwrapOptions::new())
    }

    #[must_use]
    pub fn unwrapped_with(options: UnwrapOptions) -> Self {
        Annotation::Unwrapped(options)
    }

    #[must_use]
    pub fn ignore() -> Self {
        Annotation::Ignore
    }

    #[must_use]
    pub fn append(options: AppendOptions) -> Self {
        Annotation::Append(options)
    }

    #[must_use]
    pub fn root_name() -> Self {
        Annotation::RootName(RootNameOptions::default())
    }

    #[must_use]
    pub fn root_name_value(value: impl Into<String>) -> Self {
        Annotation::RootName(RootNameOptions {
            enabled: true,
            value: Some(value.into()),
        })
    }

    #[must_use]
    pub fn property_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Annotation::PropertyOrder(PropertyOrderOptions {
            order: order.into_iter().map(Into::into).collect(),
            alphabetic: false,
        })
    }

    #[must_use]
    pub fn ignore_properties(options: IgnorePropertiesOptions) -> Self {
        Annotation::IgnoreProperties(options)
    }

    /// Renames the property a `Property`, `Getter` or `Setter` annotation contributes.
    /// Other annotations are returned unchanged.
    #[must_use]
    pub fn named(self, name: impl Into<String>) -> Self {
        match self {
            Annotation::Property(options) => Annotation::Property(options.name(name)),
            Annotation::Getter(options) => Annotation::Getter(GetterOptions {
                name: Some(name.into()),
                ..options
            }),
            Annotation::Setter(options) => Annotation::Setter(SetterOptions {
                name: Some(name.into()),
                ..options
            }),
            other => other,
        }
    }

    #[must_use]
    pub const fn key(&self) -> AnnotationKey {
        match self {
            Annotation::Property(_) => AnnotationKey::Property,
            Annotation::Getter(_) => AnnotationKey::Getter,
            Annotation::Setter(_) => AnnotationKey::Setter,
            Annotation::ClassType(_) => AnnotationKey::ClassType,
            Annotation::Include(_) => AnnotationKey::Include,
            Annotation::Unwrapped(_) => AnnotationKey::Unwrapped,
            Annotation::Ignore => AnnotationKey::Ignore,
            Annotation::Append(_) => AnnotationKey::Append,
            Annotation::RootName(_) => AnnotationKey::RootName,
            Annotation::PropertyOrder(_) => AnnotationKey::PropertyOrder,
            Annotation::IgnoreProperties(_) => AnnotationKey::IgnoreProperties,
        }
    }

    /// Whether this annotation may be attached to a target of `kind`.
    #[must_use]
    pub const fn allowed_on(&self, kind: MemberKind) -> bool {
        match self {
            Annotation::Property(_) => matches!(kind, MemberKind::Property),
            Annotation::Getter(_) | Annotation::Setter(_) => matches!(kind, MemberKind::Method),
            Annotation::ClassType(_) | Annotation::Unwrapped(_) | Annotation::Ignore => {
                matches!(kind, MemberKind::Property | MemberKind::Method)
            }
            Annotation::Include(_) => true,
            Annotation::Append(_)
            | Annotation::RootName(_)
            | Annotation::PropertyOrder(_)
            | Annotation::IgnoreProperties(_) => matches!(kind, MemberKind::Class),
        }
    }

    /// Whether this annotation makes its member part of the plan.
    #[must_use]
    pub const fn is_visibility(&self) -> bool {
        matches!(
            self,
            Annotation::Property(_) | Annotation::Getter(_) | Annotation::Setter(_)
        )
    }
}
