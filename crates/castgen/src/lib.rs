#![doc = include_str!("../README.md")]

pub mod allocation;
pub mod assertions;
pub mod error;
mod generator;
pub mod ownership;

pub use generator::*;

pub use castgen_hierarchy as hierarchy;
