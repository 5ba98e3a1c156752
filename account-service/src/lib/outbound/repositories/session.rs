use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::errors::StoreError;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::UserId;

/// Refresh sessions tracked in the `refresh_sessions` table.
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn record(&self, session: &Session) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_sessions (id, user_id, expire_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id.0)
        .bind(session.expire_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume(&self, id: &str) -> Result<bool, StoreError> {
        let consumed: Option<(String,)> =
            sqlx::query_as("DELETE FROM refresh_sessions WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(consumed.is_some())
    }

    async fn revoke_all(&self, user_id: &UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expire_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// No server-side tracking.
///
/// Every refresh token with a valid signature and expiry is accepted, and
/// sign-out cannot invalidate a token before it expires: the transport has
/// to drop the client's cookie.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatelessSessionRepository;

#[async_trait]
impl SessionRepository for StatelessSessionRepository {
    async fn record(&self, _session: &Session) -> Result<(), StoreError> {
        Ok(())
    }

    async fn consume(&self, _id: &str) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn revoke_all(&self, _user_id: &UserId) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(0)
    }
}
