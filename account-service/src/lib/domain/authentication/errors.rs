use auth::CodeFormatError;
use auth::PasswordError;
use auth::TokenError;
use auth::VerifyError;
use thiserror::Error;

use crate::domain::code::errors::CodeError;
use crate::domain::code::models::CodeKind;
use crate::domain::errors::StoreError;
use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::PasswordPolicyError;

/// Coarse classification of an [`AuthError`] for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    Expired,
    AlreadyActive,
    AlreadyConsumed,
    Internal,
}

/// Top-level error for authentication flows
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // Input validation errors
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid code: {0}")]
    InvalidCode(#[from] CodeFormatError),

    // Domain-level errors
    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),

    /// Same message for unknown email and wrong password
    #[error("wrong user email address or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User is blocked")]
    UserBlocked,

    #[error("Old password does not match")]
    PasswordMismatch,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("{0} not found")]
    CodeNotFound(CodeKind),

    #[error("{0} was expired")]
    CodeExpired(CodeKind),

    #[error("User is already active")]
    AlreadyActive,

    #[error("Refresh token was already used or revoked")]
    AlreadyConsumed,

    // Infrastructure errors
    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidEmail(_)
            | AuthError::InvalidPassword(_)
            | AuthError::InvalidCode(_) => ErrorKind::ValidationFailed,
            AuthError::EmailAlreadyExists(_) => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::Unauthorized(_) => ErrorKind::Unauthorized,
            AuthError::UserBlocked | AuthError::PasswordMismatch | AuthError::Forbidden(_) => {
                ErrorKind::Forbidden
            }
            AuthError::UserNotFound(_) | AuthError::CodeNotFound(_) => ErrorKind::NotFound,
            AuthError::CodeExpired(_) => ErrorKind::Expired,
            AuthError::AlreadyActive => ErrorKind::AlreadyActive,
            AuthError::AlreadyConsumed => ErrorKind::AlreadyConsumed,
            AuthError::Store(_) | AuthError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) if constraint == "users_email_key" => {
                AuthError::EmailAlreadyExists(constraint)
            }
            other => AuthError::Store(other),
        }
    }
}

impl From<CodeError> for AuthError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::NotFound(kind) => AuthError::CodeNotFound(kind),
            CodeError::Expired(kind) => AuthError::CodeExpired(kind),
            CodeError::Store(e) => AuthError::Store(e),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Token errors reaching the orchestrator come from issuing (internal) or
/// from a refresh token the caller presented (unauthorized).
impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EncodingFailed(_) | TokenError::InvalidSettings(_) => {
                AuthError::Internal(err.to_string())
            }
            TokenError::Malformed(_) | TokenError::InvalidSignature => {
                AuthError::Unauthorized(err.to_string())
            }
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Forbidden { .. } => AuthError::Forbidden(err.to_string()),
            VerifyError::Malformed(_) | VerifyError::InvalidSignature | VerifyError::Expired => {
                AuthError::Unauthorized(err.to_string())
            }
        }
    }
}
