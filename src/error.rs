//! Crate-level error taxonomy.

use crate::graph::GraphError;
use thiserror::Error;

/// Errors surfaced by the catalog and the engines.
///
/// `Store` wraps a lower-level graph failure with its original cause; a
/// failed traversal is never reported as an empty result.
#[derive(Error, Debug)]
pub enum Error {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("book {0} not found")]
    BookNotFound(String),

    #[error("genre {0} not found")]
    GenreNotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("graph store error")]
    Store(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, Error>;
