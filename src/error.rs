//! Errors returned by bracket operations.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during bracket operations. Every error is terminal for
/// the call; nothing is retried and nothing partial is persisted.
#[derive(Debug, Error)]
pub enum BracketError {
    /// Bad input: missing scores, a draw, too few eligible players.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request does not fit the current state: wrong match status, table taken,
    /// bracket already generated, preliminaries unfinished, no qualifiers.
    #[error("Conflict: {0}")]
    StateConflict(String),

    /// A referenced tournament or match does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything the store could not do.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Caller-facing classification of a [`BracketError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::Validation(_) => ErrorKind::Validation,
            BracketError::StateConflict(_) => ErrorKind::Conflict,
            BracketError::NotFound(_) => ErrorKind::NotFound,
            BracketError::Store(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        BracketError::StateConflict(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        BracketError::Validation(msg.into())
    }
}

pub type BracketResult<T> = Result<T, BracketError>;
