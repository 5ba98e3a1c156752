use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::UserId;

/// Server-side record of an outstanding refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Refresh token `jti`
    pub id: String,
    pub user_id: UserId,
    pub expire_at: DateTime<Utc>,
}

impl Session {
    /// Record for the refresh half of a freshly issued pair.
    pub fn for_pair(user_id: UserId, pair: &TokenPair) -> Self {
        Self {
            id: pair.refresh_id.clone(),
            user_id,
            expire_at: pair.refresh_expires_at,
        }
    }
}
