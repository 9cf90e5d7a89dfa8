//! How generated instances are owned

use castgen_hierarchy::ClassName;
use strum::{AsRefStr, Display, EnumIter};

/// The way generated test code owns the instances it allocates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, EnumIter, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OwnershipStrategy {
    /// Raw pointers, explicitly deleted once every check ran
    Raw,
    /// `unique_ptr`, released when the test scope ends
    Unique,
    /// `shared_ptr`, released when the last reference is dropped
    Shared,
}

impl OwnershipStrategy {
    /// The fixed name of the artifact generated for this strategy
    pub const fn file_name(&self) -> &'static str {
        match self {
            OwnershipStrategy::Raw => "casting_test_rawptr.h",
            OwnershipStrategy::Unique => "casting_test_unique_ptr.h",
            OwnershipStrategy::Shared => "casting_test_shared_ptr.h",
        }
    }

    /// Whether allocated instances must be released explicitly
    pub const fn requires_release(&self) -> bool {
        matches!(self, OwnershipStrategy::Raw)
    }

    /// The statement binding `binding` to a new instance of `class`
    pub fn allocation(&self, class: &ClassName, binding: &str) -> String {
        match self {
            OwnershipStrategy::Raw => format!("{class} *{binding} = new {class}();"),
            OwnershipStrategy::Unique => {
                format!("unique_ptr<{class}> {binding} = make_unique<{class}>();")
            }
            OwnershipStrategy::Shared => {
                format!("shared_ptr<{class}> {binding} = make_shared<{class}>();")
            }
        }
    }

    /// The statement releasing the instance bound to `binding`, if this strategy needs one
    pub fn release(&self, binding: &str) -> Option<String> {
        self.requires_release().then(|| format!("delete {binding};"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_statements() {
        let class = ClassName::from("VFGNode");
        assert_eq!(
            OwnershipStrategy::Raw.allocation(&class, "vFGNode"),
            "VFGNode *vFGNode = new VFGNode();"
        );
        assert_eq!(
            OwnershipStrategy::Unique.allocation(&class, "vFGNode"),
            "unique_ptr<VFGNode> vFGNode = make_unique<VFGNode>();"
        );
        assert_eq!(
            OwnershipStrategy::Shared.allocation(&class, "vFGNode"),
            "shared_ptr<VFGNode> vFGNode = make_shared<VFGNode>();"
        );
        assert_eq!(
            OwnershipStrategy::Raw.release("vFGNode").as_deref(),
            Some("delete vFGNode;")
        );
    }

    #[test]
    fn test_only_raw_requires_release() {
        let releasing = OwnershipStrategy::iter()
            .filter(|s| s.requires_release())
            .collect::<Vec<_>>();
        assert_eq!(releasing, [OwnershipStrategy::Raw]);
        assert_eq!(OwnershipStrategy::Shared.release("x"), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(OwnershipStrategy::Unique.to_string(), "unique");
        assert_eq!(OwnershipStrategy::iter().count(), 3);
    }
}
