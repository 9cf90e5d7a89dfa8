use crate::args::Args;
use castgen::CastGen;
use clap::Parser;
use std::io::{stderr, stdout};
use std::process::ExitCode;
use tracing::metadata::LevelFilter;
use tracing::{debug, info, trace, Level};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

mod args;

fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.logging().log_level_filter())?;
    trace!("starting castgen with args: {args:?}");
    debug!("castgen version: {}", env!("CARGO_PKG_VERSION"));

    let castgen = CastGen::builder()
        .loader_options(args.loader_options())
        .include_unrelated_pairs(args.unrelated_pairs)
        .narrowing_checks(!args.no_narrowing)
        .build()?;

    let artifacts = castgen.generate_from_path(&args.spec)?;
    for artifact in &artifacts {
        info!(
            "{}: {} positive and {} negative checks",
            artifact.path.display(),
            artifact.summary.assertions.positive,
            artifact.summary.assertions.negative
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    // warnings and errors go to stderr, everything else to stdout
    let writer = stderr.with_max_level(Level::WARN).or_else(stdout);
    let registry = Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer)
                .with_filter(level_filter),
        )
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}
