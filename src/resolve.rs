//! Metadata resolver.
//!
//! Turns the fragments registered for a class into its [`ResolvedPlan`]:
//!
//! 1. collect the fragments of the class and its ancestors (ancestors first, so a
//!    descendant fragment for the same member and option wins)
//! 2. merge each member's fragments per option, later over earlier
//! 3. group members into logical properties and name them (explicit name, else the
//!    member name, else the method name without its `get`/`set`/`is` prefix)
//! 4. expand unwrapped members into the nested class's properties, recursively, with
//!    cycle detection
//! 5. fold in virtual attributes before or after the members
//! 6. apply the explicit ordering override
//! 7. reject duplicate wire names
//!
//! Resolution runs with the registry's resolve lock held; nested plans needed for unwrap
//! expansion are resolved (and cached) under the same lock.

use crate::annotation::{
    AppendAttribute, AppendOptions, GetterOptions, IgnorePropertiesOptions, Inclusion,
    Position, PropertyOptions, PropertyOrderOptions, RootNameOptions, SetterOptions,
    UnwrapOptions,
};
use crate::plan::{
    PlanEntry, PropertySpec, ReadAccess, ResolvedPlan, RootWrapperSpec, UnwrapSpec,
    UnwrappedMember, VirtualAttributeSpec, WriteAccess,
};
use crate::registry::{MemberKind, MemberRef, Registry};
use crate::{Annotation, Error, Result, TypeDescriptor, Value};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Class-level options after merging.
#[derive(Default)]
struct ClassOptions {
    include: Option<Inclusion>,
    append: Option<AppendOptions>,
    root: Option<RootNameOptions>,
    order: Option<PropertyOrderOptions>,
    ignore: Option<IgnorePropertiesOptions>,
}

impl ClassOptions {
    fn merge(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::Include(inclusion) => self.include = Some(inclusion),
            Annotation::Append(options) => self.merge_append(options),
            Annotation::RootName(options) => self.root = Some(options),
            Annotation::PropertyOrder(options) => self.order = Some(options),
            Annotation::IgnoreProperties(options) => self.ignore = Some(options),
            // Registry::register only admits class-level annotations here.
            _ => {}
        }
    }

    // Attributes are additive; an attribute with a source key seen before replaces
    // the earlier one in place. Flags follow the latest fragment.
    fn merge_append(&mut self, options: AppendOptions) {
        let merged = self.append.get_or_insert_with(AppendOptions::default);
        merged.enabled = options.enabled;
        merged.prepend = options.prepend;
        for attr in options.attrs {
            match merged.attrs.iter_mut().find(|a| a.value == attr.value) {
                Some(existing) => *existing = attr,
                None => merged.attrs.push(attr),
            }
        }
    }
}

/// Merged options of one member.
#[derive(Default)]
struct MemberDraft {
    property: Option<PropertyOptions>,
    getter: Option<GetterOptions>,
    setter: Option<SetterOptions>,
    class_type: Option<TypeDescriptor>,
    include: Option<Inclusion>,
    unwrapped: Option<UnwrapOptions>,
    ignore: bool,
    visible: bool,
}

impl MemberDraft {
    fn merge(&mut self, annotation: Annotation) {
        self.visible |= annotation.is_visibility();
        match annotation {
            Annotation::Property(options) => self.property = Some(options),
            Annotation::Getter(options) => self.getter = Some(options),
            Annotation::Setter(options) => self.setter = Some(options),
            Annotation::ClassType(ty) => self.class_type = Some(ty),
            Annotation::Include(inclusion) => self.include = Some(inclusion),
            Annotation::Unwrapped(options) => self.unwrapped = Some(options),
            Annotation::Ignore => self.ignore = true,
            _ => {}
        }
    }
}

/// A logical property assembled from one field and/or accessor methods.
struct LogicalProperty {
    key: String,
    wire_name: Option<String>,
    read: Option<ReadAccess>,
    write: Option<WriteAccess>,
    value_type: Option<TypeDescriptor>,
    include: Option<Inclusion>,
    unwrapped: Option<UnwrapOptions>,
    required: bool,
}

impl LogicalProperty {
    fn new(key: String) -> Self {
        LogicalProperty {
            key,
            wire_name: None,
            read: None,
            write: None,
            value_type: None,
            include: None,
            unwrapped: None,
            required: false,
        }
    }

    fn absorb_field(&mut self, member: &str, draft: MemberDraft) {
        let options = draft.property.unwrap_or_default();
        self.wire_name = options.name.or(self.wire_name.take());
        self.required |= options.required;
        self.read = Some(ReadAccess::Field(member.to_string()));
        self.write = Some(WriteAccess::Field(member.to_string()));
        self.absorb_shared(draft.class_type, draft.include, draft.unwrapped);
    }

    fn absorb_method(&mut self, getter: Option<GetterOptions>, setter: Option<SetterOptions>) {
        if let Some(getter) = getter {
            self.wire_name = getter.name.or(self.wire_name.take());
            self.read = Some(ReadAccess::Method(getter.read));
        }
        if let Some(setter) = setter {
            self.wire_name = setter.name.or(self.wire_name.take());
            self.write = Some(WriteAccess::Method(setter.write));
        }
    }

    fn absorb_shared(
        &mut self,
        class_type: Option<TypeDescriptor>,
        include: Option<Inclusion>,
        unwrapped: Option<UnwrapOptions>,
    ) {
        if class_type.is_some() {
            self.value_type = class_type;
        }
        if include.is_some() {
            self.include = include;
        }
        if unwrapped.is_some() {
            self.unwrapped = unwrapped;
        }
    }
}

/// `getName` / `setName` / `isName` → `name`; anything else is kept as is.
pub(crate) fn infer_property_name(method: &str) -> String {
    for prefix in ["get", "set", "is"] {
        if let Some(rest) = method.strip_prefix(prefix) {
            let mut chars = rest.chars();
            if let Some(first) = chars.next() {
                if first.is_uppercase() {
                    return first.to_lowercase().chain(chars).collect();
                }
            }
        }
    }
    method.to_string()
}

pub(crate) struct Resolver<'a> {
    registry: &'a Registry,
    stack: &'a mut Vec<String>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(registry: &'a Registry, stack: &'a mut Vec<String>) -> Self {
        Resolver { registry, stack }
    }

    pub(crate) fn resolve(mut self, class: &str) -> Result<ResolvedPlan> {
        let fragments = self.registry.fragments_for(class)?;
        let defaults = self.registry.defaults_for(class)?;

        let mut class_options = ClassOptions::default();
        let mut drafts: IndexMap<MemberRef, MemberDraft> = IndexMap::new();
        for fragment in fragments {
            match fragment.member {
                None => class_options.merge(fragment.annotation),
                Some(member) => drafts.entry(member).or_default().merge(fragment.annotation),
            }
        }

        let logical = group_members(class, drafts)?;
        let default_include = class_options.include.unwrap_or_default();

        self.stack.push(class.to_string());
        let expanded = self.expand(class, logical, default_include, &defaults);
        self.stack.pop();
        let (members, unwrapped) = expanded?;

        let mut entries = fold_virtuals(members, class_options.append.as_ref());
        if let Some(order) = &class_options.order {
            entries = apply_order(entries, order);
        }
        check_collisions(class, &entries)?;

        let root = match class_options.root {
            Some(options) => RootWrapperSpec {
                enabled: options.enabled,
                wrapper_name: options.value.unwrap_or_else(|| class.to_string()),
            },
            None => RootWrapperSpec {
                enabled: false,
                wrapper_name: class.to_string(),
            },
        };
        let ignore = class_options.ignore.unwrap_or_default();

        Ok(ResolvedPlan {
            class: class.to_string(),
            entries,
            unwrapped,
            root,
            ignored: ignore.names.into_iter().collect(),
            ignore_unknown: ignore.ignore_unknown,
        })
    }

    /// Builds the member specs, replacing every unwrapped member with the flattened
    /// properties of its nested class.
    fn expand(
        &mut self,
        class: &str,
        logical: Vec<LogicalProperty>,
        default_include: Inclusion,
        defaults: &IndexMap<String, Value>,
    ) -> Result<(Vec<PropertySpec>, Vec<UnwrappedMember>)> {
        let mut members = Vec::new();
        let mut unwrapped = Vec::new();

        for property in logical {
            let value_type = property.value_type.clone().unwrap_or_default();
            let unwrap = property.unwrapped.as_ref().filter(|options| options.enabled);

            let Some(options) = unwrap else {
                members.push(PropertySpec {
                    wire_name: property.wire_name.unwrap_or_else(|| property.key.clone()),
                    default: defaults.get(&property.key).cloned(),
                    member: property.key,
                    read: property.read,
                    write: property.write,
                    value_type,
                    inclusion: property.include.unwrap_or(default_include),
                    required: property.required,
                    unwrap: None,
                    path: Vec::new(),
                });
                continue;
            };

            let nested = value_type.class_name().ok_or_else(|| {
                Error::configuration(
                    class,
                    format!(
                        "unwrapped member `{}` must declare a class type, found {}",
                        property.key, value_type
                    ),
                )
            })?;
            if self.stack.iter().any(|name| name == nested) {
                let mut chain = self.stack.clone();
                chain.push(nested.to_string());
                return Err(Error::cyclic_unwrap(chain));
            }

            tracing::trace!(class, member = %property.key, nested, "expanding unwrapped member");
            let nested_plan = self.registry.resolve_locked(nested, self.stack)?;
            let transform = UnwrapSpec {
                prefix: options.prefix.clone(),
                suffix: options.suffix.clone(),
            };

            for spec in nested_plan.properties() {
                let path = match &property.read {
                    Some(read) => std::iter::once(read.clone())
                        .chain(spec.path.iter().cloned())
                        .collect(),
                    None => Vec::new(),
                };
                members.push(PropertySpec {
                    wire_name: transform.apply(&spec.wire_name),
                    member: format!("{}.{}", property.key, spec.member),
                    read: property.read.as_ref().and(spec.read.clone()),
                    write: spec.write.clone(),
                    value_type: spec.value_type.clone(),
                    inclusion: spec.inclusion,
                    required: spec.required && property.read.is_some(),
                    default: spec.default.clone(),
                    unwrap: Some(transform.compose(spec.unwrap.as_ref())),
                    path,
                });
            }

            if let Some(write) = property.write {
                unwrapped.push(UnwrappedMember {
                    member: property.key,
                    write,
                    class: nested.to_string(),
                    unwrap: transform,
                    plan: nested_plan,
                });
            }
        }

        Ok((members, unwrapped))
    }
}

/// Merges member drafts into logical properties: fields first, in registration order,
/// then methods, which join the field of the same logical name.
fn group_members(
    class: &str,
    drafts: IndexMap<MemberRef, MemberDraft>,
) -> Result<Vec<LogicalProperty>> {
    let mut grouped: IndexMap<String, LogicalProperty> = IndexMap::new();
    let (fields, methods): (Vec<_>, Vec<_>) = drafts
        .into_iter()
        .filter(|(_, draft)| draft.visible && !draft.ignore)
        .partition(|(member, _)| member.kind == MemberKind::Property);

    for (member, draft) in fields {
        grouped
            .entry(member.name.clone())
            .or_insert_with(|| LogicalProperty::new(member.name.clone()))
            .absorb_field(&member.name, draft);
    }

    for (member, draft) in methods {
        if draft.getter.is_some() && draft.setter.is_some() {
            return Err(Error::configuration(
                class,
                format!("method `{}` cannot be both a getter and a setter", member.name),
            ));
        }
        let key = infer_property_name(&member.name);
        let property = grouped
            .entry(key.clone())
            .or_insert_with(|| LogicalProperty::new(key));
        property.absorb_method(draft.getter, draft.setter);
        property.absorb_shared(draft.class_type, draft.include, draft.unwrapped);
    }

    Ok(grouped.into_values().collect())
}

/// Places virtual attributes around the member properties. A class-level `prepend`
/// overrides every attribute's own position.
fn fold_virtuals(members: Vec<PropertySpec>, append: Option<&AppendOptions>) -> Vec<PlanEntry> {
    let virtuals: Vec<VirtualAttributeSpec> = append
        .filter(|options| options.enabled)
        .map(|options| {
            options
                .attrs
                .iter()
                .map(|attr| virtual_spec(attr, options.prepend))
                .collect()
        })
        .unwrap_or_default();

    let (prepended, appended): (Vec<_>, Vec<_>) = virtuals
        .into_iter()
        .partition(|spec| spec.position == Position::Prepend);

    prepended
        .into_iter()
        .map(PlanEntry::Virtual)
        .chain(members.into_iter().map(PlanEntry::Property))
        .chain(appended.into_iter().map(PlanEntry::Virtual))
        .collect()
}

fn virtual_spec(attr: &AppendAttribute, prepend_all: bool) -> VirtualAttributeSpec {
    let position = if prepend_all {
        Position::Prepend
    } else {
        attr.position.unwrap_or_default()
    };
    VirtualAttributeSpec {
        source_key: attr.value.clone(),
        wire_name: attr.prop_name.clone().unwrap_or_else(|| attr.value.clone()),
        position,
        inclusion: attr.include,
        required: attr.required,
    }
}

/// Explicitly named entries first, in list order; the rest keep their relative order
/// (or are sorted by wire name when `alphabetic` is set).
fn apply_order(entries: Vec<PlanEntry>, order: &PropertyOrderOptions) -> Vec<PlanEntry> {
    let rank = |entry: &PlanEntry| order.order.iter().position(|name| name == entry.wire_name());
    let (mut named, mut rest): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|entry| rank(entry).is_some());

    named.sort_by_key(|entry| rank(entry));
    if order.alphabetic {
        rest.sort_by(|a, b| a.wire_name().cmp(b.wire_name()));
    }
    named.extend(rest);
    named
}

fn check_collisions(class: &str, entries: &[PlanEntry]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.wire_name()) {
            return Err(Error::name_collision(class, entry.wire_name()));
        }
    }
    Ok(())
}
