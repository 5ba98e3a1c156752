use thiserror::Error;

/// Error type for role and capability lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid capability: {0}")]
    InvalidCapability(String),
}
