//! the args for running castgen

use castgen::hierarchy::loader::DEFAULT_SANITY_CLASS;
use castgen::hierarchy::{ClassName, LoaderOptions};
use castgen_cli_common::LoggingArgs;
use std::path::PathBuf;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(
    author,
    version,
    about = "Generates isa/dyn_cast test suites from a class hierarchy document"
)]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// The hierarchy document to generate tests for
    #[clap(value_name = "spec file", value_hint = clap::ValueHint::FilePath)]
    pub spec: PathBuf,
    /// Also check that every pair of unrelated classes refuses to cast into each other
    #[clap(long)]
    pub unrelated_pairs: bool,
    /// Only emit `isa` checks, without the matching `dyn_cast` checks
    #[clap(long)]
    pub no_narrowing: bool,
    /// A class the document must declare for it to be considered complete
    #[clap(long, value_name = "class", default_value = DEFAULT_SANITY_CLASS)]
    sanity_class: String,
}

impl Args {
    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }

    /// Gets the options used to load the hierarchy document
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions::default().sanity_class(ClassName::new(self.sanity_class.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_args_parsing() {
        let test = "castgen graph_type_info.yaml";
        let args = Args::try_parse_from(test.split(" ")).expect("could not parse test string");
        assert_eq!(args.spec, Path::new("graph_type_info.yaml"));
        assert!(!args.unrelated_pairs);
        assert!(!args.no_narrowing);
        assert_eq!(
            args.loader_options().sanity_class,
            Some(ClassName::from("VFG"))
        );
    }

    #[test]
    fn test_spec_is_required() {
        Args::try_parse_from(["castgen"]).expect_err("spec file is required");
    }

    #[test]
    fn test_flags() {
        let test = "castgen -v --unrelated-pairs --no-narrowing --sanity-class SVFG spec.yaml";
        let args = Args::try_parse_from(test.split(" ")).expect("could not parse test string");
        assert!(args.unrelated_pairs);
        assert!(args.no_narrowing);
        assert_eq!(args.logging().verbosity(), 1);
        assert_eq!(
            args.loader_options().sanity_class,
            Some(ClassName::from("SVFG"))
        );
    }
}
