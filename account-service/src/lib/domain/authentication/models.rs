use std::sync::Arc;

use auth::Clock;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenCodec;
use auth::TokenPair;

use crate::domain::code::models::ActivationCode;
use crate::domain::code::models::CodeSettings;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UserAttrs;

/// Command to register a new account with validated fields.
#[derive(Debug, Clone)]
pub struct SignUpCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub attrs: UserAttrs,
    /// Opt-in to marketing mail; transactional mail is always on
    pub marketing_emails: bool,
}

/// Registered user plus the activation code to deliver out of band.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthenticatedUser,
    pub activation_code: ActivationCode,
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: AuthenticatedUser,
    pub tokens: TokenPair,
}

/// Password to set when a reset code is applied.
#[derive(Debug, Clone)]
pub enum NewPassword {
    Supplied(Password),
    /// Let the service pick one and hand it back for delivery
    Generated,
}

#[derive(Debug, Clone)]
pub struct PasswordResetOutcome {
    pub user: AuthenticatedUser,
    pub tokens: TokenPair,
    /// Present only for [`NewPassword::Generated`]
    pub generated_password: Option<Password>,
}

/// Records removed by one housekeeping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub activation_codes: u64,
    pub reset_codes: u64,
    pub sessions: u64,
}

impl PurgeReport {
    pub fn total(&self) -> u64 {
        self.activation_codes + self.reset_codes + self.sessions
    }
}

/// Immutable building blocks shared by every request.
pub struct AuthComponents {
    pub codec: Arc<TokenCodec>,
    pub hasher: PasswordHasher,
    pub codes: CodeSettings,
    /// Role given to new sign-ups
    pub default_role: Role,
    pub clock: Arc<dyn Clock>,
}
