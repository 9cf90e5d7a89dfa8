//! The class hierarchy for ancestry querying

use crate::class::{ClassKind, ClassName};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use std::collections::HashSet;
use std::iter;
use tracing::{debug, trace};

/// The class hierarchy.
///
/// Stores, for every declared class, its direct parents in declaration order. A class may have
/// more than one direct parent. Classes that only ever appear as a parent are still part of the
/// hierarchy, they just have no parents of their own.
///
/// The hierarchy must be acyclic.
#[derive(Debug, Default, Clone)]
pub struct ClassHierarchy {
    parents: IndexMap<ClassName, Vec<ClassName>>,
    abstract_classes: HashSet<ClassName>,
}

impl ClassHierarchy {
    /// Creates a new, empty class hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a class. Declaring a class more than once has no effect.
    pub fn declare(&mut self, class: impl Into<ClassName>) {
        self.parents.entry(class.into()).or_default();
    }

    /// Appends `parent` to the direct parents of `child`, declaring `child` if needed.
    ///
    /// Repeated declarations of the same parent are kept.
    pub fn add_parent(&mut self, child: impl Into<ClassName>, parent: impl Into<ClassName>) {
        let child = child.into();
        let parent = parent.into();
        let parents = self.parents.entry(child).or_default();
        if parents.contains(&parent) {
            debug!("{parent} is declared as a parent more than once");
        }
        parents.push(parent);
    }

    /// Flags a class as abstract
    pub fn mark_abstract(&mut self, class: impl Into<ClassName>) {
        self.abstract_classes.insert(class.into());
    }

    /// Gets the direct parents of a class. Unknown classes have no parents.
    pub fn parents(&self, class: &ClassName) -> &[ClassName] {
        self.parents
            .get(class)
            .map(|parents| parents.as_slice())
            .unwrap_or_default()
    }

    /// Checks if a class is mentioned anywhere in this hierarchy, either as a child or as a parent.
    pub fn contains(&self, class: &ClassName) -> bool {
        self.parents.contains_key(class) || self.parents.values().flatten().any(|p| p == class)
    }

    /// Checks if a class was declared as a key of the adjacency
    pub fn is_declared(&self, class: &ClassName) -> bool {
        self.parents.contains_key(class)
    }

    /// Checks whether a class is flagged as abstract
    pub fn is_abstract(&self, class: &ClassName) -> bool {
        self.abstract_classes.contains(class)
    }

    /// Gets the kind of a class
    pub fn kind(&self, class: &ClassName) -> ClassKind {
        if self.is_abstract(class) {
            ClassKind::Abstract
        } else {
            ClassKind::Concrete
        }
    }

    /// Gets the set of abstract classes
    pub fn abstract_classes(&self) -> &HashSet<ClassName> {
        &self.abstract_classes
    }

    /// Iterates over each declared class and its direct parents, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&ClassName, &[ClassName])> {
        self.parents
            .iter()
            .map(|(child, parents)| (child, parents.as_slice()))
    }

    /// Every class mentioned in this hierarchy, each exactly once.
    ///
    /// Classes are ordered by first mention, visiting each declared class followed by its parents.
    pub fn classes(&self) -> impl Iterator<Item = &ClassName> {
        self.parents
            .iter()
            .flat_map(|(child, parents)| iter::once(child).chain(parents))
            .unique()
    }

    /// Every declared `(child, parent)` edge, in declaration order
    pub fn edges(&self) -> impl Iterator<Item = (&ClassName, &ClassName)> {
        self.parents
            .iter()
            .flat_map(|(child, parents)| parents.iter().map(move |parent| (child, parent)))
    }

    /// Gets every class reachable from `class` by following direct parents one or more steps.
    ///
    /// Ancestors are ordered by depth-first discovery. An ancestor reachable through several paths
    /// is only walked once.
    ///
    /// ```rust
    /// # use castgen_hierarchy::ClassHierarchy;
    /// let mut hierarchy = ClassHierarchy::new();
    /// hierarchy.add_parent("B", "A");
    /// hierarchy.add_parent("C", "B");
    /// let closure = hierarchy.closure(&"C".into());
    /// assert_eq!(closure.len(), 2);
    /// ```
    pub fn closure(&self, class: &ClassName) -> IndexSet<ClassName> {
        let mut visited = IndexSet::new();
        self.collect_ancestors(class, &mut visited);
        trace!("closure of {class}: {:?}", visited);
        visited
    }

    fn collect_ancestors(&self, class: &ClassName, visited: &mut IndexSet<ClassName>) {
        for parent in self.parents(class) {
            if visited.insert(parent.clone()) {
                self.collect_ancestors(parent, visited);
            }
        }
    }

    /// Checks if either class is in the closure of the other
    pub fn is_related(&self, a: &ClassName, b: &ClassName) -> bool {
        self.closure(a).contains(b) || self.closure(b).contains(a)
    }

    /// The number of classes in this hierarchy
    pub fn len(&self) -> usize {
        self.classes().count()
    }

    /// Checks if no classes are in this hierarchy
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
