use std::fmt;
use std::sync::Arc;

use auth::code::validate_code;
use auth::CodeFormatError;
use auth::CodeGenerator;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

/// One-time code value.
///
/// Inbound strings are checked for length and characters before they are
/// used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    /// # Errors
    /// * `Empty` / `TooLong` / `InvalidCharacters`
    pub fn new(code: String) -> Result<Self, CodeFormatError> {
        validate_code(&code)?;
        Ok(Self(code))
    }

    /// Wrap a value produced by a `CodeGenerator`, whose output always
    /// satisfies the inbound format.
    pub(crate) fn generated(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a one-time code is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    Activation,
    Reset,
}

impl CodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::Activation => "activation code",
            CodeKind::Reset => "reset code",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-use, time-boxed code bound to a subject.
///
/// Never updated: created, read once, deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode<S> {
    pub code: Code,
    pub subject: S,
    pub expire_at: DateTime<Utc>,
}

impl<S> OneTimeCode<S> {
    /// Valid while `now < expire_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expire_at
    }
}

/// Activation code, bound to the user it activates.
pub type ActivationCode = OneTimeCode<UserId>;

/// Password reset code, bound to the account email.
pub type ResetCode = OneTimeCode<EmailAddress>;

/// Code generation and expiry windows.
#[derive(Debug, Clone)]
pub struct CodeSettings {
    pub generator: Arc<CodeGenerator>,
    pub activation_window: Duration,
    pub reset_window: Duration,
}

impl Default for CodeSettings {
    fn default() -> Self {
        Self {
            generator: Arc::new(CodeGenerator::default()),
            activation_window: Duration::hours(24),
            reset_window: Duration::hours(2),
        }
    }
}
