//! Writes one cast test artifact per ownership strategy

use crate::allocation::AllocationPlanner;
use crate::assertions::{
    AssertionOptions, EmissionSummary, RelatednessAssertionEmitter, RelatednessMemo,
};
use crate::error::{CastGenError, CastGenResult};
use crate::ownership::OwnershipStrategy;
use castgen_hierarchy::{ClassHierarchy, HierarchySpecLoader, LoaderOptions};
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{debug, info, info_span};

/// Generates cast test artifacts for a class hierarchy.
///
/// Must be configured using a [CastGenBuilder].
#[derive(Debug)]
pub struct CastGen {
    output_directory: PathBuf,
    loader_options: LoaderOptions,
    assertions: AssertionOptions,
}

impl CastGen {
    /// Creates the default CastGenBuilder
    #[inline]
    pub fn builder() -> CastGenBuilder {
        CastGenBuilder::new()
    }

    /// Loads a hierarchy document and generates the artifacts for it.
    ///
    /// Nothing is written if the document can not be loaded.
    pub fn generate_from_path(&self, spec: &Path) -> CastGenResult<Vec<GeneratedArtifact>> {
        let loaded = HierarchySpecLoader::new(self.loader_options.clone()).load_path(spec)?;
        let source = spec
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.display().to_string());
        self.generate(&loaded.hierarchy, &source)
    }

    /// Generates one artifact per ownership strategy into the output directory.
    ///
    /// `source` names the hierarchy in the header of each artifact. Nothing is written if two
    /// classes share a binding. Artifacts are written one after another, so an I/O failure can
    /// leave earlier artifacts written.
    pub fn generate(
        &self,
        hierarchy: &ClassHierarchy,
        source: &str,
    ) -> CastGenResult<Vec<GeneratedArtifact>> {
        // bindings do not depend on the ownership strategy
        if let Some(collision) =
            AllocationPlanner::new(hierarchy, OwnershipStrategy::Raw).binding_collision()
        {
            return Err(collision.into());
        }
        OwnershipStrategy::iter()
            .map(|strategy| self.write_artifact(hierarchy, source, strategy))
            .collect()
    }

    fn write_artifact(
        &self,
        hierarchy: &ClassHierarchy,
        source: &str,
        strategy: OwnershipStrategy,
    ) -> CastGenResult<GeneratedArtifact> {
        let _span = info_span!("artifact", %strategy).entered();
        let path = self.output_directory.join(strategy.file_name());
        debug!("writing {path:?}");

        let write = || -> io::Result<ArtifactSummary> {
            let mut writer = BufWriter::new(File::create(&path)?);
            let summary = self.render(hierarchy, source, strategy, &mut writer)?;
            writer.flush()?;
            Ok(summary)
        };
        let summary = write().map_err(|e| CastGenError::Write(path.clone(), e))?;

        info!(
            "wrote {path:?} with {} allocations and {} checked pairs",
            summary.allocations, summary.assertions.pairs
        );
        Ok(GeneratedArtifact {
            strategy,
            path,
            summary,
        })
    }

    /// Renders the artifact for one ownership strategy.
    ///
    /// Every call plans its allocations and checks from scratch, nothing is shared between
    /// artifacts.
    pub fn render<W: Write>(
        &self,
        hierarchy: &ClassHierarchy,
        source: &str,
        strategy: OwnershipStrategy,
        w: &mut W,
    ) -> io::Result<ArtifactSummary> {
        write_prolog(w, source)?;

        let planner = AllocationPlanner::new(hierarchy, strategy);
        writeln!(w, "// BEGIN OF object allocation")?;
        planner.write_allocations(w)?;
        writeln!(w, "// END OF object allocation")?;
        writeln!(w)?;

        writeln!(w, "// BEGIN OF cast testing")?;
        let mut memo = RelatednessMemo::new();
        let assertions = RelatednessAssertionEmitter::new(hierarchy, self.assertions)
            .write_assertions(w, &mut memo)?;
        writeln!(w, "// END OF cast testing")?;

        let mut releases = 0;
        if strategy.requires_release() {
            writeln!(w)?;
            writeln!(w, "// BEGIN OF object deallocation")?;
            releases = planner.write_releases(w)?;
            writeln!(w, "// END OF object deallocation")?;
        }

        Ok(ArtifactSummary {
            allocations: planner.records().len(),
            releases,
            assertions,
        })
    }
}

fn write_prolog<W: Write>(w: &mut W, source: &str) -> io::Result<()> {
    writeln!(w, "/// This file is automatically generated by")?;
    writeln!(w, "/// castgen {source}")?;
    writeln!(w)?;
    writeln!(w, "/// DO NOT edit this file manually")?;
    writeln!(w)?;
    Ok(())
}

/// What was written into one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub allocations: usize,
    pub releases: usize,
    pub assertions: EmissionSummary,
}

/// An artifact written to disk
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub strategy: OwnershipStrategy,
    pub path: PathBuf,
    pub summary: ArtifactSummary,
}

/// Builder for creating a [CastGen] instance.
#[derive(Debug)]
pub struct CastGenBuilder {
    output_directory: PathBuf,
    loader_options: LoaderOptions,
    assertions: AssertionOptions,
}

impl CastGenBuilder {
    /// Creates a CastGenBuilder with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory artifacts are written into
    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = path.as_ref().to_path_buf();
        self
    }

    /// Sets the options used to load hierarchy documents
    pub fn loader_options(mut self, options: LoaderOptions) -> Self {
        self.loader_options = options;
        self
    }

    /// Sets whether unrelated classes are checked against each other
    pub fn include_unrelated_pairs(mut self, include: bool) -> Self {
        self.assertions.include_unrelated_pairs = include;
        self
    }

    /// Sets whether `dyn_cast` checks accompany the `isa` checks
    pub fn narrowing_checks(mut self, enabled: bool) -> Self {
        self.assertions.narrowing_checks = enabled;
        self
    }

    /// Builds a [CastGen] instance from this builder
    pub fn build(self) -> Result<CastGen, BuildCastGenError> {
        let output_dir_meta = std::fs::metadata(&self.output_directory).map_err(|e| {
            BuildCastGenError::OutputDirectoryDoesNotExist(self.output_directory.clone(), e)
        })?;
        if !output_dir_meta.is_dir() {
            return Err(BuildCastGenError::OutputDirectoryIsNotADirectory(
                self.output_directory,
            ));
        }
        Ok(CastGen {
            output_directory: self.output_directory,
            loader_options: self.loader_options,
            assertions: self.assertions,
        })
    }
}

impl Default for CastGenBuilder {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            loader_options: LoaderOptions::default(),
            assertions: AssertionOptions::default(),
        }
    }
}

/// An error occurred while building a [CastGen] instance
#[derive(Debug, Error)]
pub enum BuildCastGenError {
    #[error("{0:?} does not exist: {1}")]
    OutputDirectoryDoesNotExist(PathBuf, io::Error),
    #[error("{0:?} is not a directory")]
    OutputDirectoryIsNotADirectory(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use castgen_hierarchy::ClassHierarchy;
    use test_log::test;

    fn render(
        hierarchy: &ClassHierarchy,
        strategy: OwnershipStrategy,
    ) -> (String, ArtifactSummary) {
        let castgen = CastGen::builder().build().expect("working directory exists");
        let mut buffer = vec![];
        let summary = castgen
            .render(hierarchy, "test.yaml", strategy, &mut buffer)
            .unwrap();
        (String::from_utf8(buffer).unwrap(), summary)
    }

    #[test]
    fn test_render_raw() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.add_parent("VFGNode", "GenericNode");
        hierarchy.mark_abstract("GenericNode");
        let (output, summary) = render(&hierarchy, OwnershipStrategy::Raw);
        assert_eq!(
            output,
            "\
/// This file is automatically generated by
/// castgen test.yaml

/// DO NOT edit this file manually

// BEGIN OF object allocation
VFGNode *vFGNode = new VFGNode();
// END OF object allocation

// BEGIN OF cast testing
ASSERT_TRUE(llvm::isa<GenericNode>(vFGNode));
ASSERT_NE(llvm::dyn_cast<GenericNode>(vFGNode), nullptr);
// END OF cast testing

// BEGIN OF object deallocation
delete vFGNode;
// END OF object deallocation
"
        );
        assert_eq!(summary.allocations, 1);
        assert_eq!(summary.releases, 1);
    }

    #[test]
    fn test_render_shared_has_no_deallocation() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.add_parent("VFGNode", "GenericNode");
        let (output, summary) = render(&hierarchy, OwnershipStrategy::Shared);
        assert!(
            output.contains("shared_ptr<GenericNode> genericNode = make_shared<GenericNode>();")
        );
        assert!(!output.contains("deallocation"));
        assert!(!output.contains("delete"));
        assert_eq!(summary.releases, 0);
        assert_eq!(summary.assertions.negative, 1);
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = CastGen::builder()
            .output_directory(dir.path().join("missing"))
            .build()
            .expect_err("directory does not exist");
        assert!(matches!(err, BuildCastGenError::OutputDirectoryDoesNotExist(..)));
    }

    #[test]
    fn test_output_directory_is_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = CastGen::builder()
            .output_directory(file.path())
            .build()
            .expect_err("path is a file");
        assert!(matches!(err, BuildCastGenError::OutputDirectoryIsNotADirectory(..)));
    }
}
