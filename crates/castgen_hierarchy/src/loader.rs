//! Loads a [`ClassHierarchy`] from a declarative hierarchy document

use crate::class::ClassName;
use crate::hierarchy::ClassHierarchy;
use crate::spec_node::{EntryLocation, HierarchyNode, MalformedEntry};
use serde_yaml::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// The field listing abstract classes
pub const ABSTRACT_CLASSES_FIELD: &str = "AbstractClasses";
/// The categories read by default, in order
pub const DEFAULT_CATEGORIES: &[&str] = &["GraphTypes", "NodeTypes", "EdgeTypes"];
/// A class every complete hierarchy declares
pub const DEFAULT_SANITY_CLASS: &str = "VFG";

/// Options for loading a hierarchy
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// The category fields to read, in order
    pub categories: Vec<String>,
    /// A class that must be present once loaded, if any
    pub sanity_class: Option<ClassName>,
}

impl LoaderOptions {
    /// Sets the category fields to read
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the class that must be present once loaded
    pub fn sanity_class(mut self, class: impl Into<Option<ClassName>>) -> Self {
        self.sanity_class = class.into();
        self
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            sanity_class: Some(ClassName::from(DEFAULT_SANITY_CLASS)),
        }
    }
}

/// A successfully loaded hierarchy, along with any entries that had to be skipped
#[derive(Debug)]
pub struct LoadedHierarchy {
    pub hierarchy: ClassHierarchy,
    pub diagnostics: Vec<MalformedEntry>,
}

/// Reads hierarchy documents into a [`ClassHierarchy`].
#[derive(Debug, Default)]
pub struct HierarchySpecLoader {
    options: LoaderOptions,
}

impl HierarchySpecLoader {
    /// Creates a new loader with the given options
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads a hierarchy document from a file
    pub fn load_path(&self, path: &Path) -> Result<LoadedHierarchy> {
        debug!("loading hierarchy from {path:?}");
        let contents =
            std::fs::read_to_string(path).map_err(|e| LoadError::Io(path.to_path_buf(), e))?;
        self.load_str(&contents)
    }

    /// Loads a hierarchy document from a string
    pub fn load_str(&self, contents: &str) -> Result<LoadedHierarchy> {
        let value = serde_yaml::from_str::<Value>(contents)?;
        self.load_value(&value)
    }

    /// Loads a hierarchy document that was already parsed.
    ///
    /// Malformed forest entries are logged and skipped. Structural problems with the document
    /// itself, or a missing sanity class, fail the whole load.
    pub fn load_value(&self, document: &Value) -> Result<LoadedHierarchy> {
        let Value::Mapping(document) = document else {
            return Err(LoadError::NotAMapping);
        };

        let mut hierarchy = ClassHierarchy::new();
        let mut diagnostics = vec![];

        for category in &self.options.categories {
            let Some(forest) = document.get(category.as_str()) else {
                debug!("hierarchy does not declare category {category}");
                continue;
            };
            let location = EntryLocation::category(category.as_str());
            let nodes = HierarchyNode::parse_forest(forest, &location, &mut diagnostics);
            trace!("category {category} has {} top level classes", nodes.len());
            insert_forest(&mut hierarchy, &nodes, None);
        }

        for diagnostic in &diagnostics {
            warn!("skipping malformed entry: {diagnostic}");
        }

        for class in read_abstract_classes(document)? {
            if !hierarchy.contains(&class) {
                warn!("abstract class {class} is not part of the hierarchy");
            }
            hierarchy.mark_abstract(class);
        }

        if let Some(sanity_class) = &self.options.sanity_class {
            if !hierarchy.is_declared(sanity_class) {
                return Err(LoadError::MissingSanityClass(sanity_class.clone()));
            }
        }

        debug!(
            "loaded {} classes ({} abstract) with {} skipped entries",
            hierarchy.len(),
            hierarchy.abstract_classes().len(),
            diagnostics.len()
        );
        Ok(LoadedHierarchy {
            hierarchy,
            diagnostics,
        })
    }
}

/// Declares every class of a forest, depth first, recording each child's parent.
fn insert_forest(
    hierarchy: &mut ClassHierarchy,
    nodes: &[HierarchyNode],
    parent: Option<&ClassName>,
) {
    for node in nodes {
        match parent {
            Some(parent) => hierarchy.add_parent(node.name().clone(), parent.clone()),
            None => hierarchy.declare(node.name().clone()),
        }
        insert_forest(hierarchy, node.children(), Some(node.name()));
    }
}

fn read_abstract_classes(document: &serde_yaml::Mapping) -> Result<Vec<ClassName>> {
    let classes = match document.get(ABSTRACT_CLASSES_FIELD) {
        None => return Err(LoadError::MissingAbstractClasses),
        Some(Value::Null) => return Ok(vec![]),
        Some(Value::Sequence(classes)) => classes,
        Some(other) => {
            return Err(LoadError::MalformedAbstractClasses(format!("{other:?}")));
        }
    };

    Ok(classes
        .iter()
        .filter_map(|class| match class {
            Value::String(name) if !name.trim().is_empty() => Some(ClassName::from(name.as_str())),
            other => {
                warn!("skipping malformed abstract class entry {other:?}");
                None
            }
        })
        .collect())
}

/// A hierarchy document could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {0:?}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("a hierarchy document must be a mapping")]
    NotAMapping,
    #[error("required field AbstractClasses is missing")]
    MissingAbstractClasses,
    #[error("AbstractClasses must be a sequence of class names, found {0}")]
    MalformedAbstractClasses(String),
    #[error("{0} is not declared in the hierarchy, the document is incomplete")]
    MissingSanityClass(ClassName),
}

pub type Result<T = ()> = std::result::Result<T, LoadError>;
