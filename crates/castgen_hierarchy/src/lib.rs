#![doc = include_str!("../README.md")]

pub mod class;
pub mod hierarchy;
pub mod loader;
pub mod spec_node;

pub use self::{
    class::{ClassKind, ClassName},
    hierarchy::ClassHierarchy,
    loader::{HierarchySpecLoader, LoadError, LoadedHierarchy, LoaderOptions},
    spec_node::{HierarchyNode, MalformedEntry},
};
