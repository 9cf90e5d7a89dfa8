#![doc = include_str!("../README.md")]

use clap::{value_parser, ArgAction, Args};

/// Common way to set logging levels
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct LoggingArgs {
    /// Increase logging verbosity (`-vv` for trace output)
    #[clap(
        short = 'v',
        value_parser = value_parser!(u8).range(0..=2),
        action = ArgAction::Count,
        conflicts_with = "quiet"
    )]
    verbose: u8,
    /// Decrease logging verbosity (`-qq` silences everything)
    #[clap(
        short = 'q',
        value_parser = value_parser!(u8).range(0..=2),
        action = ArgAction::Count,
        conflicts_with = "verbose"
    )]
    quiet: u8,
}

impl LoggingArgs {
    /// The sum of `-v` flags minus `-q` flags, clamped to `-2..=2`
    pub fn verbosity(&self) -> i8 {
        (self.verbose.min(2) as i8 - self.quiet.min(2) as i8).clamp(-2, 2)
    }

    /// Gets the logging level based on whether `-v[v]` or `-q[q]` has been used,
    #[cfg(feature = "tracing")]
    pub fn log_level_filter(&self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self.verbosity() {
            -2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
