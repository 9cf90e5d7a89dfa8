//! Plans which instances a generated artifact allocates and releases

use crate::ownership::OwnershipStrategy;
use castgen_hierarchy::{ClassHierarchy, ClassName};
use std::collections::{HashMap, HashSet};
use std::io;
use std::io::Write;
use thiserror::Error;
use tracing::trace;

/// One generated instance of a concrete class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    class: ClassName,
    binding: String,
    strategy: OwnershipStrategy,
}

impl AllocationRecord {
    /// The allocated class
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// The identifier the instance is bound to
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// The statement creating this instance
    pub fn allocation(&self) -> String {
        self.strategy.allocation(&self.class, &self.binding)
    }

    /// The statement releasing this instance, if it needs one
    pub fn release(&self) -> Option<String> {
        self.strategy.release(&self.binding)
    }
}

/// Decides which classes get an instance in one artifact.
///
/// Every concrete class mentioned in the hierarchy is allocated exactly once. Abstract classes
/// are never allocated. A planner covers a single artifact, so a fresh one must be created for
/// each ownership strategy.
#[derive(Debug)]
pub struct AllocationPlanner {
    strategy: OwnershipStrategy,
    records: Vec<AllocationRecord>,
}

impl AllocationPlanner {
    /// Plans the allocations for a hierarchy
    pub fn new(hierarchy: &ClassHierarchy, strategy: OwnershipStrategy) -> Self {
        let mut planner = Self {
            strategy,
            records: vec![],
        };
        let mut written = HashSet::new();
        for (class, parents) in hierarchy.iter() {
            planner.plan(hierarchy, class, &mut written);
            for parent in parents {
                planner.plan(hierarchy, parent, &mut written);
            }
        }
        planner
    }

    fn plan<'h>(
        &mut self,
        hierarchy: &ClassHierarchy,
        class: &'h ClassName,
        written: &mut HashSet<&'h ClassName>,
    ) {
        if hierarchy.is_abstract(class) || !written.insert(class) {
            return;
        }
        trace!("allocating {class} with {} ownership", self.strategy);
        self.records.push(AllocationRecord {
            class: class.clone(),
            binding: class.binding(),
            strategy: self.strategy,
        });
    }

    /// Finds the first two planned classes that are bound to the same identifier, in allocation
    /// order.
    pub fn binding_collision(&self) -> Option<BindingCollision> {
        let mut bindings: HashMap<&str, &ClassName> = HashMap::new();
        self.records.iter().find_map(|record| {
            bindings
                .insert(&record.binding, &record.class)
                .map(|previous| BindingCollision {
                    first: previous.clone(),
                    second: record.class.clone(),
                    binding: record.binding.clone(),
                })
        })
    }

    /// The planned allocations, in allocation order
    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    /// Checks if a class has an instance
    pub fn is_allocated(&self, class: &ClassName) -> bool {
        self.records.iter().any(|r| &r.class == class)
    }

    /// Writes one allocation statement per planned instance
    pub fn write_allocations<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for record in &self.records {
            writeln!(w, "{}", record.allocation())?;
        }
        Ok(())
    }

    /// Writes one release statement per planned instance, if the strategy requires them.
    ///
    /// Returns the number of statements written.
    pub fn write_releases<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let mut count = 0;
        for release in self.records.iter().filter_map(|r| r.release()) {
            writeln!(w, "{release}")?;
            count += 1;
        }
        Ok(count)
    }
}

/// Two classes would be bound to the same identifier in generated code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{first} and {second} are both bound to `{binding}`")]
pub struct BindingCollision {
    pub first: ClassName,
    pub second: ClassName,
    pub binding: String,
}
