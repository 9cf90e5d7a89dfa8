//! A castgen error

use crate::allocation::BindingCollision;
use castgen_hierarchy::LoadError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An error occurred while generating cast tests
#[derive(Debug, Error)]
pub enum CastGenError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    BindingCollision(#[from] BindingCollision),
    #[error("could not write {0:?}: {1}")]
    Write(PathBuf, #[source] io::Error),
}

/// A type alias for general results in castgen
pub type CastGenResult<T> = Result<T, CastGenError>;
