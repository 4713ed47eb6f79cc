//! Resolved plans.
//!
//! A [`ResolvedPlan`] is the merged, ordered, conflict-free mapping description of one
//! class. It is built once by the resolver, cached in the registry and shared read-only
//! by both engines.
//!
//! A plan is a sequence of [`PlanEntry`] values in output order. Member properties have
//! already been renamed and unwrapped: a member flattened from a nested class appears as
//! ordinary [`PropertySpec`]s whose `path` leads from the root instance to the nested
//! instance that owns the value. The unwrapped members themselves are listed separately
//! ([`UnwrappedMember`]) because reading a document needs them to rebuild the nested
//! instances.

use crate::annotation::{Inclusion, Position, ReadFn, WriteFn};
use crate::{Instance, TypeDescriptor, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// How a property value is read from an instance.
#[derive(Clone)]
pub enum ReadAccess {
    Field(String),
    Method(ReadFn),
}

impl ReadAccess {
    /// Reads the value; `None` means absent.
    #[must_use]
    pub fn read(&self, instance: &Instance) -> Option<Value> {
        match self {
            ReadAccess::Field(name) => instance.get(name).cloned(),
            ReadAccess::Method(read) => read(instance),
        }
    }
}

impl fmt::Debug for ReadAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadAccess::Field(name) => write!(f, "Field({})", name),
            ReadAccess::Method(_) => write!(f, "Method(..)"),
        }
    }
}

/// How a property value is written to an instance.
#[derive(Clone)]
pub enum WriteAccess {
    Field(String),
    Method(WriteFn),
}

impl WriteAccess {
    pub fn write(&self, instance: &mut Instance, value: Value) {
        match self {
            WriteAccess::Field(name) => instance.set(name.clone(), value),
            WriteAccess::Method(write) => write(instance, value),
        }
    }
}

impl fmt::Debug for WriteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteAccess::Field(name) => write!(f, "Field({})", name),
            WriteAccess::Method(_) => write!(f, "Method(..)"),
        }
    }
}

/// Name transform of an unwrapped member.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UnwrapSpec {
    pub prefix: String,
    pub suffix: String,
}

impl UnwrapSpec {
    /// `prefix + name + suffix`.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.suffix)
    }

    /// Strips the prefix and suffix from `key`, if both are present.
    #[must_use]
    pub fn reverse<'k>(&self, key: &'k str) -> Option<&'k str> {
        let rest = key.strip_prefix(self.prefix.as_str())?;
        let inner = rest.strip_suffix(self.suffix.as_str())?;
        (!inner.is_empty()).then_some(inner)
    }

    /// The transform equivalent to applying `inner` and then `self`.
    #[must_use]
    pub fn compose(&self, inner: Option<&UnwrapSpec>) -> UnwrapSpec {
        match inner {
            Some(inner) => UnwrapSpec {
                prefix: format!("{}{}", self.prefix, inner.prefix),
                suffix: format!("{}{}", inner.suffix, self.suffix),
            },
            None => self.clone(),
        }
    }
}

/// One member property of a plan.
#[derive(Clone, Debug)]
pub struct PropertySpec {
    pub wire_name: String,
    /// Logical member name in the class that declares it. Flattened specs carry the
    /// dotted path from the plan's class, e.g. `name.first`.
    pub member: String,
    pub read: Option<ReadAccess>,
    pub write: Option<WriteAccess>,
    pub value_type: TypeDescriptor,
    pub inclusion: Inclusion,
    pub required: bool,
    /// Constructor default, compared against by [`Inclusion::NonDefault`].
    pub default: Option<Value>,
    /// Accumulated transform when this spec was flattened out of nested classes.
    pub unwrap: Option<UnwrapSpec>,
    /// Read accessors leading from the root instance to the instance owning the value.
    /// Empty for flattened specs whose unwrapped member cannot be read.
    pub path: Vec<ReadAccess>,
}

impl PropertySpec {
    /// Whether this spec was flattened out of a nested class.
    #[must_use]
    pub fn is_flattened(&self) -> bool {
        self.unwrap.is_some()
    }
}

/// A serialize-only field sourced from the caller's attribute map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualAttributeSpec {
    pub source_key: String,
    pub wire_name: String,
    pub position: Position,
    pub inclusion: Inclusion,
    pub required: bool,
}

/// Outer single-key wrapper of the root document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootWrapperSpec {
    pub enabled: bool,
    pub wrapper_name: String,
}

/// A member whose nested class was flattened into this plan.
#[derive(Clone, Debug)]
pub struct UnwrappedMember {
    pub member: String,
    pub write: WriteAccess,
    pub class: String,
    pub unwrap: UnwrapSpec,
    pub plan: Arc<ResolvedPlan>,
}

#[derive(Clone, Debug)]
pub enum PlanEntry {
    Property(PropertySpec),
    Virtual(VirtualAttributeSpec),
}

impl PlanEntry {
    #[must_use]
    pub fn wire_name(&self) -> &str {
        match self {
            PlanEntry::Property(spec) => &spec.wire_name,
            PlanEntry::Virtual(spec) => &spec.wire_name,
        }
    }
}

/// The resolved mapping plan of one class.
#[derive(Clone, Debug)]
pub struct ResolvedPlan {
    pub(crate) class: String,
    pub(crate) entries: Vec<PlanEntry>,
    pub(crate) unwrapped: Vec<UnwrappedMember>,
    pub(crate) root: RootWrapperSpec,
    pub(crate) ignored: HashSet<String>,
    pub(crate) ignore_unknown: bool,
}

impl ResolvedPlan {
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// All entries in output order.
    #[must_use]
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertySpec> {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Property(spec) => Some(spec),
            PlanEntry::Virtual(_) => None,
        })
    }

    pub fn virtuals(&self) -> impl Iterator<Item = &VirtualAttributeSpec> {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Virtual(spec) => Some(spec),
            PlanEntry::Property(_) => None,
        })
    }

    #[must_use]
    pub fn unwrapped(&self) -> &[UnwrappedMember] {
        &self.unwrapped
    }

    #[must_use]
    pub fn root(&self) -> &RootWrapperSpec {
        &self.root
    }

    /// Wire names in output order.
    #[must_use]
    pub fn wire_names(&self) -> Vec<&str> {
        self.entries.iter().map(PlanEntry::wire_name).collect()
    }

    /// The property spec emitted under `wire_name`.
    #[must_use]
    pub fn property(&self, wire_name: &str) -> Option<&PropertySpec> {
        self.properties().find(|spec| spec.wire_name == wire_name)
    }

    #[must_use]
    pub fn is_virtual(&self, wire_name: &str) -> bool {
        self.virtuals().any(|spec| spec.wire_name == wire_name)
    }

    /// Whether `key` is declared as always ignored on read.
    #[must_use]
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored.contains(key)
    }

    #[must_use]
    pub fn ignores_unknown(&self) -> bool {
        self.ignore_unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_apply_and_reverse() {
        let spec = UnwrapSpec {
            prefix: "parentPrefix-".to_string(),
            suffix: "-parentSuffix".to_string(),
        };
        let wire = spec.apply("first");
        assert_eq!(wire, "parentPrefix-first-parentSuffix");
        assert_eq!(spec.reverse(&wire), Some("first"));
        assert_eq!(spec.reverse("first"), None);
        assert_eq!(spec.reverse("parentPrefix--parentSuffix"), None);
    }

    #[test]
    fn test_unwrap_compose() {
        let outer = UnwrapSpec {
            prefix: "a_".to_string(),
            suffix: "_z".to_string(),
        };
        let inner = UnwrapSpec {
            prefix: "b_".to_string(),
            suffix: "_y".to_string(),
        };
        let composed = outer.compose(Some(&inner));
        assert_eq!(composed.apply("x"), outer.apply(&inner.apply("x")));
        assert_eq!(outer.compose(None), outer);
    }

    #[test]
    fn test_empty_unwrap_reverses_everything() {
        let spec = UnwrapSpec::default();
        assert_eq!(spec.reverse("id"), Some("id"));
    }

    #[test]
    fn test_accessors() {
        let mut user = Instance::new("User");
        WriteAccess::Field("id".to_string()).write(&mut user, Value::from(1));
        assert_eq!(ReadAccess::Field("id".to_string()).read(&user), Some(Value::from(1)));

        let getter = ReadAccess::Method(Arc::new(|i: &Instance| i.get("id").cloned()));
        assert_eq!(getter.read(&user), Some(Value::from(1)));
    }
}
