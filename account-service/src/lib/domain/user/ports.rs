use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserAttrs;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserSettings;
use crate::domain::user::models::UserStatus;

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `Conflict` - Email is already registered
    /// * `Database` - Database operation failed
    async fn create(&self, user: User) -> Result<User, StoreError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Retrieve user by (normalised) email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, StoreError>;

    /// Compare-and-set the user's status.
    ///
    /// # Returns
    /// `true` if the user was in `from` and is now in `to`; `false` if the
    /// user exists in another status or does not exist
    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, StoreError>;

    /// Replace the stored password hash.
    ///
    /// # Errors
    /// * `RowNotFound` - User does not exist
    async fn update_password_hash(&self, id: &UserId, password_hash: &str)
        -> Result<(), StoreError>;

    /// Replace the profile attributes.
    ///
    /// # Errors
    /// * `RowNotFound` - User does not exist
    async fn update_attrs(&self, id: &UserId, attrs: &UserAttrs) -> Result<(), StoreError>;

    /// Replace the settings.
    ///
    /// # Errors
    /// * `RowNotFound` - User does not exist
    async fn update_settings(&self, id: &UserId, settings: &UserSettings)
        -> Result<(), StoreError>;
}
