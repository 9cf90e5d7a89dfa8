//! Emits the relatedness checks of a generated artifact.
//!
//! For every `(descendant, ancestor)` pair reachable through the hierarchy, the descendant's
//! instance must be an instance of the ancestor, and the ancestor's instance must not be an
//! instance of the descendant. Checks against abstract classes are skipped, as no instance of
//! them exists.

use castgen_hierarchy::{ClassHierarchy, ClassName};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::io;
use std::io::Write;
use tracing::{debug, trace};

/// Options controlling which checks are emitted
#[derive(Debug, Clone, Copy)]
pub struct AssertionOptions {
    /// Also check that `dyn_cast` succeeds or fails along with `isa`
    pub narrowing_checks: bool,
    /// Also check every pair of unrelated classes against each other.
    ///
    /// This grows quadratically with the number of classes.
    pub include_unrelated_pairs: bool,
}

impl Default for AssertionOptions {
    fn default() -> Self {
        Self {
            narrowing_checks: true,
            include_unrelated_pairs: false,
        }
    }
}

/// The `(descendant, ancestor)` pairs already checked within one artifact
#[derive(Debug, Default)]
pub struct RelatednessMemo {
    pairs: HashSet<(ClassName, ClassName)>,
}

impl RelatednessMemo {
    /// Creates a new, empty memo
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pair, returning `false` if it was already recorded
    pub fn insert(&mut self, descendant: &ClassName, ancestor: &ClassName) -> bool {
        self.pairs.insert((descendant.clone(), ancestor.clone()))
    }

    /// Checks if a pair was recorded
    pub fn contains(&self, descendant: &ClassName, ancestor: &ClassName) -> bool {
        self.pairs.contains(&(descendant.clone(), ancestor.clone()))
    }

    /// The number of recorded pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Checks if no pairs were recorded
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Counts of what an emitter wrote
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmissionSummary {
    /// Unique related pairs visited
    pub pairs: usize,
    /// Checks that a descendant is an instance of an ancestor
    pub positive: usize,
    /// Checks that an ancestor is not an instance of a descendant
    pub negative: usize,
    /// Checks that a class is not an instance of an unrelated class
    pub unrelated: usize,
}

/// Writes relatedness checks for a hierarchy
#[derive(Debug)]
pub struct RelatednessAssertionEmitter<'h> {
    hierarchy: &'h ClassHierarchy,
    options: AssertionOptions,
}

impl<'h> RelatednessAssertionEmitter<'h> {
    /// Creates a new emitter
    pub fn new(hierarchy: &'h ClassHierarchy, options: AssertionOptions) -> Self {
        Self { hierarchy, options }
    }

    /// Writes the checks for every related pair not yet in `memo`, recording them as it goes.
    ///
    /// Pairs are visited in declaration order, ascending depth first from each declared edge.
    pub fn write_assertions<W: Write>(
        &self,
        w: &mut W,
        memo: &mut RelatednessMemo,
    ) -> io::Result<EmissionSummary> {
        let mut summary = EmissionSummary::default();
        for (child, parent) in self.hierarchy.edges() {
            self.ascend(w, memo, &mut summary, child, parent)?;
        }
        if self.options.include_unrelated_pairs {
            self.write_unrelated(w, &mut summary)?;
        }
        debug!("emitted {summary:?}");
        Ok(summary)
    }

    fn ascend<W: Write>(
        &self,
        w: &mut W,
        memo: &mut RelatednessMemo,
        summary: &mut EmissionSummary,
        descendant: &ClassName,
        ancestor: &ClassName,
    ) -> io::Result<()> {
        if !memo.insert(descendant, ancestor) {
            return Ok(());
        }
        trace!("checking {descendant} against {ancestor}");
        summary.pairs += 1;

        if !self.hierarchy.is_abstract(descendant) {
            self.write_is_instance(w, descendant, ancestor)?;
            summary.positive += 1;
        }
        if !self.hierarchy.is_abstract(ancestor) {
            self.write_is_not_instance(w, ancestor, descendant)?;
            summary.negative += 1;
        }

        for grandparent in self.hierarchy.parents(ancestor) {
            self.ascend(w, memo, summary, descendant, grandparent)?;
        }
        Ok(())
    }

    fn write_unrelated<W: Write>(
        &self,
        w: &mut W,
        summary: &mut EmissionSummary,
    ) -> io::Result<()> {
        let classes = self.hierarchy.classes().collect::<Vec<_>>();
        let closures = classes
            .iter()
            .map(|&class| (class, self.hierarchy.closure(class)))
            .collect::<HashMap<_, _>>();

        for (&a, &b) in classes.iter().tuple_combinations() {
            if closures[a].contains(b) || closures[b].contains(a) {
                continue;
            }
            if !self.hierarchy.is_abstract(a) {
                self.write_is_not_instance(w, a, b)?;
                summary.unrelated += 1;
            }
            if !self.hierarchy.is_abstract(b) {
                self.write_is_not_instance(w, b, a)?;
                summary.unrelated += 1;
            }
        }
        Ok(())
    }

    /// The instance of `instance` must be a `target`
    fn write_is_instance<W: Write>(
        &self,
        w: &mut W,
        instance: &ClassName,
        target: &ClassName,
    ) -> io::Result<()> {
        let binding = instance.binding();
        writeln!(w, "ASSERT_TRUE(llvm::isa<{target}>({binding}));")?;
        if self.options.narrowing_checks {
            writeln!(w, "ASSERT_NE(llvm::dyn_cast<{target}>({binding}), nullptr);")?;
        }
        Ok(())
    }

    /// The instance of `instance` must not be a `target`
    fn write_is_not_instance<W: Write>(
        &self,
        w: &mut W,
        instance: &ClassName,
        target: &ClassName,
    ) -> io::Result<()> {
        let binding = instance.binding();
        writeln!(w, "ASSERT_FALSE(llvm::isa<{target}>({binding}));")?;
        if self.options.narrowing_checks {
            writeln!(w, "ASSERT_EQ(llvm::dyn_cast<{target}>({binding}), nullptr);")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn diamond() -> ClassHierarchy {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.declare("A");
        hierarchy.add_parent("B", "A");
        hierarchy.add_parent("C", "A");
        hierarchy.add_parent("D", "B");
        hierarchy.add_parent("D", "C");
        hierarchy
    }

    fn emit(hierarchy: &ClassHierarchy, options: AssertionOptions) -> (String, EmissionSummary) {
        let mut buffer = vec![];
        let mut memo = RelatednessMemo::new();
        let summary = RelatednessAssertionEmitter::new(hierarchy, options)
            .write_assertions(&mut buffer, &mut memo)
            .unwrap();
        assert_eq!(memo.len(), summary.pairs);
        (String::from_utf8(buffer).unwrap(), summary)
    }

    fn count(output: &str, line: &str) -> usize {
        output.lines().filter(|l| *l == line).count()
    }

    #[test]
    fn test_diamond_pairs_once() {
        let (output, summary) = emit(&diamond(), AssertionOptions::default());
        for ancestor in ["A", "B", "C"] {
            assert_eq!(
                count(&output, &format!("ASSERT_TRUE(llvm::isa<{ancestor}>(d));")),
                1,
                "(D, {ancestor}) positive check"
            );
            assert_eq!(
                count(
                    &output,
                    &format!("ASSERT_FALSE(llvm::isa<D>({}));", ancestor.to_lowercase())
                ),
                1,
                "(D, {ancestor}) negative check"
            );
        }
        // (B,A) (C,A) (D,B) (D,A) (D,C)
        assert_eq!(summary.pairs, 5);
        assert_eq!(summary.positive, 5);
        assert_eq!(summary.negative, 5);
        assert_eq!(output.lines().count(), 20);
    }

    #[test]
    fn test_depth_first_order() {
        let options = AssertionOptions {
            narrowing_checks: false,
            ..Default::default()
        };
        let (output, _) = emit(&diamond(), options);
        let positives = output
            .lines()
            .filter(|l| l.starts_with("ASSERT_TRUE"))
            .collect::<Vec<_>>();
        assert_eq!(
            positives,
            [
                "ASSERT_TRUE(llvm::isa<A>(b));",
                "ASSERT_TRUE(llvm::isa<A>(c));",
                "ASSERT_TRUE(llvm::isa<B>(d));",
                "ASSERT_TRUE(llvm::isa<A>(d));",
                "ASSERT_TRUE(llvm::isa<C>(d));",
            ]
        );
    }

    #[test]
    fn test_transitive_ancestors_are_checked() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.add_parent("InterBlockNode", "ICFGNode");
        hierarchy.add_parent("FunEntryBlockNode", "InterBlockNode");
        let (output, _) = emit(&hierarchy, AssertionOptions::default());
        assert_eq!(
            count(&output, "ASSERT_TRUE(llvm::isa<ICFGNode>(funEntryBlockNode));"),
            1
        );
        assert_eq!(
            count(&output, "ASSERT_NE(llvm::dyn_cast<ICFGNode>(funEntryBlockNode), nullptr);"),
            1
        );
        assert_eq!(
            count(&output, "ASSERT_EQ(llvm::dyn_cast<FunEntryBlockNode>(iCFGNode), nullptr);"),
            1
        );
    }

    #[test]
    fn test_abstract_classes_are_not_instances() {
        let mut hierarchy = diamond();
        hierarchy.mark_abstract("A");
        hierarchy.mark_abstract("D");
        let (output, summary) = emit(&hierarchy, AssertionOptions::default());
        assert!(!output.contains("(a)"), "abstract A has no instance");
        assert!(!output.contains("(d)"), "abstract D has no instance");
        assert_eq!(summary.pairs, 5);
        // (B,A) (C,A)
        assert_eq!(summary.positive, 2);
        // (D,B) (D,C)
        assert_eq!(summary.negative, 2);
    }

    #[test]
    fn test_memo_is_shared_across_calls() {
        let hierarchy = diamond();
        let emitter = RelatednessAssertionEmitter::new(&hierarchy, AssertionOptions::default());
        let mut memo = RelatednessMemo::new();
        let mut first = vec![];
        emitter.write_assertions(&mut first, &mut memo).unwrap();
        let mut second = vec![];
        let summary = emitter.write_assertions(&mut second, &mut memo).unwrap();
        assert!(second.is_empty());
        assert_eq!(summary, EmissionSummary::default());
        assert!(memo.contains(&"D".into(), &"A".into()));
    }

    #[test]
    fn test_no_edges_no_assertions() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.declare("VFG");
        let (output, summary) = emit(&hierarchy, AssertionOptions::default());
        assert!(output.is_empty());
        assert_eq!(summary.pairs, 0);
    }

    #[test]
    fn test_unrelated_pairs() {
        let mut hierarchy = diamond();
        hierarchy.declare("Z");
        hierarchy.mark_abstract("Z");
        let options = AssertionOptions {
            narrowing_checks: false,
            include_unrelated_pairs: true,
        };
        let (output, summary) = emit(&hierarchy, options);
        assert_eq!(count(&output, "ASSERT_FALSE(llvm::isa<C>(b));"), 1);
        assert_eq!(count(&output, "ASSERT_FALSE(llvm::isa<B>(c));"), 1);
        assert_eq!(count(&output, "ASSERT_FALSE(llvm::isa<Z>(a));"), 1);
        assert!(!output.contains("(z)"));
        // B-C both ways, then Z against each of A, B, C, D one way
        assert_eq!(summary.unrelated, 6);
    }

    #[test]
    fn test_unrelated_pairs_disabled_by_default() {
        let mut hierarchy = diamond();
        hierarchy.declare("Z");
        let (_, summary) = emit(&hierarchy, AssertionOptions::default());
        assert_eq!(summary.unrelated, 0);
    }
}
