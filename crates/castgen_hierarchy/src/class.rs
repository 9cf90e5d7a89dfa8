//! Class names and kinds

use castgen_common::case::camel_case;
use std::borrow::Borrow;

/// Whether instances of a class can be created
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClassKind {
    Abstract,
    Concrete,
}

/// The name of a class within a hierarchy. Names are case-sensitive.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Clone, derive_more::Display)]
pub struct ClassName(String);

impl ClassName {
    /// Creates a new class name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Gets this name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier a generated instance of this class is bound to.
    ///
    /// ```rust
    /// # use castgen_hierarchy::ClassName;
    /// assert_eq!(ClassName::from("VFGNode").binding(), "vFGNode");
    /// ```
    pub fn binding(&self) -> String {
        camel_case(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ClassName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ClassName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ClassName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
