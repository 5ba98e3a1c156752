use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::NewPassword;
use crate::domain::authentication::models::PasswordResetOutcome;
use crate::domain::authentication::models::PurgeReport;
use crate::domain::authentication::models::SignUpCommand;
use crate::domain::authentication::models::SignUpOutcome;
use crate::domain::authentication::models::SignedIn;
use crate::domain::code::models::Code;
use crate::domain::code::models::ResetCode;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UserAttrs;
use crate::domain::user::models::UserSettings;

/// Authentication flows offered to the transport layer.
///
/// Protected operations take the raw access token and admit the caller
/// through the credential verifier before doing anything else.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register an unconfirmed account and issue its activation code.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Store` - Database operation failed
    async fn sign_up(&self, command: SignUpCommand) -> Result<SignUpOutcome, AuthError>;

    /// Redeem an activation code and mark the account active.
    ///
    /// # Errors
    /// * `CodeNotFound` - Unknown or already used code
    /// * `CodeExpired` - Code window has passed
    /// * `AlreadyActive` - Account was not unconfirmed
    async fn activate(&self, code: &Code) -> Result<AuthenticatedUser, AuthError>;

    /// Check credentials and open a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `UserBlocked` - Correct password for a blocked account
    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<SignedIn, AuthError>;

    /// Invalidate a refresh token now.
    ///
    /// With stateless sessions nothing is revoked server-side and the
    /// transport must clear the cookie.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is malformed or forged
    async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Revoke every tracked session of the caller.
    ///
    /// # Returns
    /// Number of revoked sessions
    async fn sign_out_everywhere(&self, access_token: &str) -> Result<u64, AuthError>;

    /// Rotate a refresh token into a new pair carrying the current role's
    /// capabilities.
    ///
    /// # Errors
    /// * `Unauthorized` - Malformed, forged or expired token, or the user is
    ///   gone or blocked
    /// * `AlreadyConsumed` - Token was already rotated or revoked
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<SignedIn, AuthError>;

    /// Issue a reset code for `email`.
    ///
    /// # Returns
    /// `None` for an unknown email, so the caller can answer the same way
    /// in both cases
    async fn request_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<ResetCode>, AuthError>;

    /// Redeem a reset code, set the new password, revoke existing sessions
    /// and sign the user in.
    ///
    /// # Errors
    /// * `CodeNotFound` / `CodeExpired` - Code cannot be redeemed
    /// * `UserNotFound` - Account was removed after the code was issued
    /// * `UserBlocked` - Account is blocked
    async fn apply_password_reset(
        &self,
        code: &Code,
        new_password: NewPassword,
    ) -> Result<PasswordResetOutcome, AuthError>;

    /// Requires `user_password:update`.
    ///
    /// # Errors
    /// * `PasswordMismatch` - `old_password` is wrong
    async fn change_password(
        &self,
        access_token: &str,
        old_password: &Password,
        new_password: &Password,
    ) -> Result<(), AuthError>;

    /// Requires `user_attrs:update`.
    async fn update_user_attrs(
        &self,
        access_token: &str,
        attrs: UserAttrs,
    ) -> Result<AuthenticatedUser, AuthError>;

    /// Requires `user_settings:update`.
    async fn update_user_settings(
        &self,
        access_token: &str,
        settings: UserSettings,
    ) -> Result<AuthenticatedUser, AuthError>;

    async fn current_user(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Delete expired codes and sessions.
    async fn purge_expired(&self) -> Result<PurgeReport, AuthError>;
}
