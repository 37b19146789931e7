//! Error types for entry-point discovery and packaging

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntryError {
    #[error("Library name must not be empty")]
    EmptyLibraryName,

    #[error("Cannot access {}: {}", path.display(), source)]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate entry: {key} (declared in {} and {})", first.display(), second.display())]
    Duplicate {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("You cannot package a library without an index entry")]
    MissingIndex,
}

impl EntryError {
    pub(crate) fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Access {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EntryError>;
