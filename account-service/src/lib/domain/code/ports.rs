use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::code::models::Code;
use crate::domain::code::models::OneTimeCode;
use crate::domain::errors::StoreError;

/// Persistence for one kind of one-time code, keyed by code value and
/// bound to a subject of type `S`.
#[async_trait]
pub trait CodeRepository<S>: Send + Sync + 'static
where
    S: Send + Sync + 'static,
{
    /// Persist a freshly issued code.
    ///
    /// # Errors
    /// * `Conflict` - The code value already exists
    async fn insert(&self, code: &OneTimeCode<S>) -> Result<(), StoreError>;

    /// Look a code up without consuming it.
    async fn find(&self, code: &Code) -> Result<Option<OneTimeCode<S>>, StoreError>;

    /// Atomically delete the code if it is still valid at `now`
    /// (`now < expire_at`) and return it.
    ///
    /// Of two concurrent callers with the same code, at most one gets
    /// `Some`. Expired records are left in place.
    async fn take_unexpired(
        &self,
        code: &Code,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode<S>>, StoreError>;

    /// Delete every code bound to `subject`.
    ///
    /// # Returns
    /// Number of deleted codes
    async fn delete_for_subject(&self, subject: &S) -> Result<u64, StoreError>;

    /// Delete every code with `expire_at <= now`.
    ///
    /// # Returns
    /// Number of deleted codes
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
