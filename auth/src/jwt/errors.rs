use thiserror::Error;

/// Error type for token encoding and decoding.
///
/// Decoding never judges expiry; that is the verifier's job.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Invalid token settings: {0}")]
    InvalidSettings(String),
}
