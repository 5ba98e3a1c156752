use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::StoreError;
use crate::domain::session::models::Session;
use crate::domain::user::models::UserId;

/// Tracking of issued refresh tokens.
///
/// A tracked store makes sign-out and rotation authoritative. The stateless
/// adapter accepts everything and revokes nothing, leaving invalidation to
/// the client dropping its cookie.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    async fn record(&self, session: &Session) -> Result<(), StoreError>;

    /// Atomically delete the session with `id`.
    ///
    /// # Returns
    /// `true` if this call removed it; `false` if it was already rotated,
    /// revoked or never recorded
    async fn consume(&self, id: &str) -> Result<bool, StoreError>;

    /// Delete every session of `user_id`.
    ///
    /// # Returns
    /// Number of revoked sessions
    async fn revoke_all(&self, user_id: &UserId) -> Result<u64, StoreError>;

    /// Delete every session with `expire_at <= now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
