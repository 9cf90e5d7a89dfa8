//! Small helpers shared between the castgen crates.

pub mod case;
