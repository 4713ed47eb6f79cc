//! Metadata registry.
//!
//! The [`Registry`] is the central store of class definitions and configuration
//! fragments. Every registration call appends one [`Fragment`]; nothing is ever merged
//! at registration time. The resolver reads the fragments of a class (and of its
//! ancestors) on the first mapping request and caches the resulting plan here.
//!
//! ## Lifecycle
//!
//! The registry is populated first and read afterwards. Once a class has been resolved,
//! the fragments of that class and of its ancestors are sealed: registering another
//! fragment for a sealed class is a configuration error instead of a silent change of
//! an already cached plan.
//!
//! Registration and resolution are guarded, so a registry can be shared between threads.
//! Resolution is serialized: a class is resolved at most once, by the first caller.
//!
//! ## Examples
//!
//! ```rust
//! use serde_mapper::{Annotation, Registry, TypeDescriptor};
//!
//! let registry = Registry::new();
//! registry
//!     .annotate_property("User", "id", Annotation::property())?
//!     .annotate_property("User", "id", Annotation::class_type(TypeDescriptor::Number))?
//!     .annotate_property("User", "email", Annotation::property())?;
//!
//! let plan = registry.resolve("User")?;
//! assert_eq!(plan.wire_names(), vec!["id", "email"]);
//! # Ok::<(), serde_mapper::Error>(())
//! ```

use crate::plan::ResolvedPlan;
use crate::resolve::Resolver;
use crate::{Annotation, Error, Instance, Result, Value};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Kind of the target a fragment is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Method,
    Class,
}

/// A named member of a class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub name: String,
    pub kind: MemberKind,
}

/// One registered unit of configuration.
#[derive(Clone, Debug)]
pub struct Fragment {
    pub target: String,
    /// `None` for class-level fragments.
    pub member: Option<MemberRef>,
    pub annotation: Annotation,
}

impl Fragment {
    #[must_use]
    pub fn class(target: impl Into<String>, annotation: Annotation) -> Self {
        Fragment {
            target: target.into(),
            member: None,
            annotation,
        }
    }

    #[must_use]
    pub fn property(
        target: impl Into<String>,
        member: impl Into<String>,
        annotation: Annotation,
    ) -> Self {
        Self::member(target, member, MemberKind::Property, annotation)
    }

    #[must_use]
    pub fn method(
        target: impl Into<String>,
        member: impl Into<String>,
        annotation: Annotation,
    ) -> Self {
        Self::member(target, member, MemberKind::Method, annotation)
    }

    fn member(
        target: impl Into<String>,
        member: impl Into<String>,
        kind: MemberKind,
        annotation: Annotation,
    ) -> Self {
        Fragment {
            target: target.into(),
            member: Some(MemberRef {
                name: member.into(),
                kind,
            }),
            annotation,
        }
    }

    /// Kind of the target, `Class` for class-level fragments.
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.member
            .as_ref()
            .map_or(MemberKind::Class, |member| member.kind)
    }
}

/// Definition of a class: its parent and the defaults its designated constructor sets.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub defaults: IndexMap<String, Value>,
}

impl ClassDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Value the designated constructor assigns to `member`.
    #[must_use]
    pub fn default_value(mut self, member: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(member.into(), value.into());
        self
    }

    /// Runs the designated constructor.
    #[must_use]
    pub fn construct(&self) -> Instance {
        self.defaults
            .iter()
            .fold(Instance::new(self.name.clone()), |instance, (member, value)| {
                instance.with(member.clone(), value.clone())
            })
    }
}

#[derive(Debug)]
struct ClassEntry {
    def: ClassDef,
    fragments: Vec<Fragment>,
}

impl ClassEntry {
    fn implicit(name: &str) -> Self {
        ClassEntry {
            def: ClassDef::new(name),
            fragments: Vec::new(),
        }
    }
}

/// Process-wide store of class definitions, fragments and resolved plans.
#[derive(Default)]
pub struct Registry {
    classes: RwLock<HashMap<String, ClassEntry>>,
    sealed: RwLock<HashSet<String>>,
    plans: RwLock<HashMap<String, Arc<ResolvedPlan>>>,
    resolving: Mutex<()>,
}

impl Registry {
    /// Creates an empty, independent registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide registry.
    #[must_use]
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Defines (or redefines) a class: its parent and constructor defaults.
    ///
    /// # Errors
    ///
    /// Fails if the class is already sealed by a resolution.
    pub fn define_class(&self, def: ClassDef) -> Result<&Self> {
        self.ensure_open(&def.name)?;
        let mut classes = self.classes.write();
        match classes.get_mut(&def.name) {
            Some(entry) => entry.def = def,
            None => {
                classes.insert(
                    def.name.clone(),
                    ClassEntry {
                        def,
                        fragments: Vec::new(),
                    },
                );
            }
        }
        Ok(self)
    }

    /// Appends a fragment to its target class.
    ///
    /// # Errors
    ///
    /// Fails if the annotation is not valid on the fragment's target kind, or if the
    /// class is already sealed.
    pub fn register(&self, fragment: Fragment) -> Result<&Self> {
        if !fragment.annotation.allowed_on(fragment.kind()) {
            return Err(Error::configuration(
                &fragment.target,
                format!(
                    "{:?} cannot be attached to a {:?} target",
                    fragment.annotation.key(),
                    fragment.kind()
                ),
            ));
        }
        self.ensure_open(&fragment.target)?;
        let mut classes = self.classes.write();
        classes
            .entry(fragment.target.clone())
            .or_insert_with(|| ClassEntry::implicit(&fragment.target))
            .fragments
            .push(fragment);
        Ok(self)
    }

    pub fn annotate_class(&self, class: &str, annotation: Annotation) -> Result<&Self> {
        self.register(Fragment::class(class, annotation))
    }

    pub fn annotate_property(
        &self,
        class: &str,
        member: &str,
        annotation: Annotation,
    ) -> Result<&Self> {
        self.register(Fragment::property(class, member, annotation))
    }

    pub fn annotate_method(
        &self,
        class: &str,
        member: &str,
        annotation: Annotation,
    ) -> Result<&Self> {
        self.register(Fragment::method(class, member, annotation))
    }

    fn ensure_open(&self, class: &str) -> Result<()> {
        if self.sealed.read().contains(class) {
            tracing::warn!(class, "rejected fragment for an already resolved class");
            return Err(Error::configuration(
                class,
                "class is already resolved; register its configuration before first use",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.read().contains_key(class)
    }

    /// Returns the definition of `class`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownClass`] if nothing was ever registered for it.
    pub fn class_def(&self, class: &str) -> Result<ClassDef> {
        self.classes
            .read()
            .get(class)
            .map(|entry| entry.def.clone())
            .ok_or_else(|| Error::unknown_class(class))
    }

    /// Runs the designated constructor of `class`: ancestor defaults first, each
    /// descendant overriding them.
    pub fn construct(&self, class: &str) -> Result<Instance> {
        let defaults = self.defaults_for(class)?;
        Ok(defaults
            .into_iter()
            .fold(Instance::new(class), |instance, (member, value)| {
                instance.with(member, value)
            }))
    }

    /// Constructor defaults of `class` merged along its lineage.
    pub fn defaults_for(&self, class: &str) -> Result<IndexMap<String, Value>> {
        let lineage = self.lineage(class)?;
        let classes = self.classes.read();
        let mut defaults = IndexMap::new();
        for entry in lineage.iter().filter_map(|name| classes.get(name)) {
            for (member, value) in &entry.def.defaults {
                defaults.insert(member.clone(), value.clone());
            }
        }
        Ok(defaults)
    }

    /// Inheritance chain of `class`, root ancestor first and `class` last.
    ///
    /// # Errors
    ///
    /// Unknown classes in the chain and inheritance cycles are configuration errors.
    pub fn lineage(&self, class: &str) -> Result<Vec<String>> {
        let classes = self.classes.read();
        let mut chain = Vec::new();
        let mut current = Some(class.to_string());
        while let Some(name) = current {
            if chain.contains(&name) {
                return Err(Error::configuration(class, "inheritance cycle"));
            }
            let entry = classes.get(&name).ok_or_else(|| Error::unknown_class(&name))?;
            current = entry.def.parent.clone();
            chain.push(name);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Returns `true` when `class` is `ancestor` or descends from it.
    #[must_use]
    pub fn is_assignable(&self, class: &str, ancestor: &str) -> bool {
        self.lineage(class)
            .map(|chain| chain.iter().any(|name| name == ancestor))
            .unwrap_or(false)
    }

    /// All fragments that apply to `class`, ancestors' first, each class's fragments in
    /// registration order. Reading them seals every class in the lineage.
    pub(crate) fn fragments_for(&self, class: &str) -> Result<Vec<Fragment>> {
        let lineage = self.lineage(class)?;
        let fragments = {
            let classes = self.classes.read();
            lineage
                .iter()
                .filter_map(|name| classes.get(name))
                .flat_map(|entry| entry.fragments.iter().cloned())
                .collect()
        };
        self.sealed.write().extend(lineage);
        Ok(fragments)
    }

    /// Returns the resolved plan of `class`, resolving and caching it on first use.
    ///
    /// # Errors
    ///
    /// Configuration errors found while resolving; they are not cached.
    pub fn resolve(&self, class: &str) -> Result<Arc<ResolvedPlan>> {
        if let Some(plan) = self.plans.read().get(class) {
            tracing::trace!(class, "plan cache hit");
            return Ok(Arc::clone(plan));
        }

        let _guard = self.resolving.lock();
        self.resolve_locked(class, &mut Vec::new())
    }

    /// Resolution with the resolve lock held. `stack` holds the classes whose unwrap
    /// expansion is in progress.
    pub(crate) fn resolve_locked(
        &self,
        class: &str,
        stack: &mut Vec<String>,
    ) -> Result<Arc<ResolvedPlan>> {
        if let Some(plan) = self.plans.read().get(class) {
            return Ok(Arc::clone(plan));
        }

        let plan = Arc::new(Resolver::new(self, stack).resolve(class)?);
        tracing::debug!(
            class,
            entries = plan.entries().len(),
            "resolved mapping plan"
        );
        self.plans
            .write()
            .insert(class.to_string(), Arc::clone(&plan));
        Ok(plan)
    }

    #[must_use]
    pub fn is_resolved(&self, class: &str) -> bool {
        self.plans.read().contains_key(class)
    }
}
