use thiserror::Error;

use crate::domain::code::models::CodeKind;
use crate::domain::errors::StoreError;

/// Error for one-time code operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    /// Never issued, or already consumed
    #[error("{0} not found")]
    NotFound(CodeKind),

    #[error("{0} was expired")]
    Expired(CodeKind),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
