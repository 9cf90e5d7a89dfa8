//! The nested form of a declared hierarchy.
//!
//! A category in a hierarchy document is a forest. Each item of the forest is either a plain
//! name, which is a leaf, or a single-key mapping from a parent name to its direct children.

use crate::class::ClassName;
use itertools::Itertools;
use serde_yaml::Value;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A node of a declared class forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyNode {
    /// A class declared without children
    Leaf(ClassName),
    /// A class declared together with its direct children
    Parent(ClassName, Vec<HierarchyNode>),
}

impl HierarchyNode {
    /// Gets the name of the class this node declares
    pub fn name(&self) -> &ClassName {
        match self {
            HierarchyNode::Leaf(name) => name,
            HierarchyNode::Parent(name, _) => name,
        }
    }

    /// Gets the direct children of this node
    pub fn children(&self) -> &[HierarchyNode] {
        match self {
            HierarchyNode::Leaf(_) => &[],
            HierarchyNode::Parent(_, children) => children,
        }
    }

    /// Tries to create a node from a single forest item.
    ///
    /// An `Err` means the item itself is malformed and must be skipped. Malformed items found
    /// further down among its children are skipped individually and pushed into `diagnostics`,
    /// leaving the rest of the node intact.
    pub fn from_value(
        value: &Value,
        location: &EntryLocation,
        diagnostics: &mut Vec<MalformedEntry>,
    ) -> Result<Self, MalformedEntry> {
        match value {
            Value::String(name) => Ok(Self::Leaf(class_name(name, location, value)?)),
            Value::Mapping(mapping) => match mapping.iter().exactly_one() {
                Ok((key, children)) => Self::from_entry(key, children, location, diagnostics),
                Err(_) => Err(MalformedEntry::new(
                    location,
                    MalformedKind::KeyCount(mapping.len()),
                    value,
                )),
            },
            other => Err(MalformedEntry::new(
                location,
                MalformedKind::UnexpectedItem,
                other,
            )),
        }
    }

    /// Creates a node from a `parent: children` pair.
    ///
    /// Children that are neither a forest nor `null` are reported, and the parent is kept without
    /// them.
    fn from_entry(
        key: &Value,
        children: &Value,
        location: &EntryLocation,
        diagnostics: &mut Vec<MalformedEntry>,
    ) -> Result<Self, MalformedEntry> {
        let Value::String(name) = key else {
            return Err(MalformedEntry::new(location, MalformedKind::NonStringName, key));
        };
        let name = class_name(name, location, key)?;
        match children {
            Value::Null => Ok(Self::Parent(name, vec![])),
            Value::Sequence(_) | Value::Mapping(_) => {
                let location = location.child(&name);
                let children = Self::parse_forest(children, &location, diagnostics);
                Ok(Self::Parent(name, children))
            }
            other => {
                diagnostics.push(MalformedEntry::new(
                    &location.child(&name),
                    MalformedKind::UnexpectedChildren,
                    other,
                ));
                Ok(Self::Parent(name, vec![]))
            }
        }
    }

    /// Parses a forest of items.
    ///
    /// A sequence is read item by item. A mapping is read entry by entry, each entry being one
    /// `parent: children` item. `null` is an empty forest. Malformed items are skipped and pushed
    /// into `diagnostics`.
    pub fn parse_forest(
        value: &Value,
        location: &EntryLocation,
        diagnostics: &mut Vec<MalformedEntry>,
    ) -> Vec<Self> {
        let mut nodes = vec![];
        match value {
            Value::Null => {}
            Value::Sequence(items) => {
                for item in items {
                    let result = Self::from_value(item, location, diagnostics);
                    keep(result, &mut nodes, diagnostics);
                }
            }
            Value::Mapping(mapping) => {
                for (key, children) in mapping {
                    let result = Self::from_entry(key, children, location, diagnostics);
                    keep(result, &mut nodes, diagnostics);
                }
            }
            other => diagnostics.push(MalformedEntry::new(
                location,
                MalformedKind::UnexpectedForest,
                other,
            )),
        }
        nodes
    }
}

fn keep(
    result: Result<HierarchyNode, MalformedEntry>,
    nodes: &mut Vec<HierarchyNode>,
    diagnostics: &mut Vec<MalformedEntry>,
) {
    match result {
        Ok(node) => nodes.push(node),
        Err(e) => diagnostics.push(e),
    }
}

fn class_name(
    name: &str,
    location: &EntryLocation,
    value: &Value,
) -> Result<ClassName, MalformedEntry> {
    if name.trim().is_empty() {
        return Err(MalformedEntry::new(location, MalformedKind::EmptyName, value));
    }
    Ok(ClassName::from(name))
}

/// Where in a hierarchy document an entry was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    category: String,
    path: Vec<ClassName>,
}

impl EntryLocation {
    /// The top level of a category
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            path: vec![],
        }
    }

    /// The location of the children of `parent`
    pub fn child(&self, parent: &ClassName) -> Self {
        let mut path = self.path.clone();
        path.push(parent.clone());
        Self {
            category: self.category.clone(),
            path,
        }
    }

    /// The category this location is in
    pub fn category_name(&self) -> &str {
        &self.category
    }

    /// The parents enclosing this location, outermost first
    pub fn path(&self) -> &[ClassName] {
        &self.path
    }
}

impl Display for EntryLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category)?;
        for parent in &self.path {
            write!(f, " > {parent}")?;
        }
        Ok(())
    }
}

/// Why an entry could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("expected a class name or a single-key mapping")]
    UnexpectedItem,
    #[error("mapping has {0} keys, expected exactly one")]
    KeyCount(usize),
    #[error("class names must be strings")]
    NonStringName,
    #[error("class names can not be empty")]
    EmptyName,
    #[error("children must be a sequence or a mapping")]
    UnexpectedChildren,
    #[error("a category must be a sequence or a mapping")]
    UnexpectedForest,
}

/// A non-fatal diagnostic for an entry that was skipped while reading a forest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {kind}, found {found}")]
pub struct MalformedEntry {
    location: EntryLocation,
    kind: MalformedKind,
    found: String,
}

impl MalformedEntry {
    fn new(location: &EntryLocation, kind: MalformedKind, found: &Value) -> Self {
        Self {
            location: location.clone(),
            kind,
            found: describe(found),
        }
    }

    /// Where the entry was found
    pub fn location(&self) -> &EntryLocation {
        &self.location
    }

    /// Why the entry was skipped
    pub fn kind(&self) -> MalformedKind {
        self.kind
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean `{b}`"),
        Value::Number(n) => format!("number `{n}`"),
        Value::String(s) => format!("string {s:?}"),
        Value::Sequence(items) => format!("a sequence of {} items", items.len()),
        Value::Mapping(mapping) => format!(
            "a mapping with keys [{}]",
            mapping.keys().map(describe).join(", ")
        ),
        Value::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
    }
}
