use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::code::models::ActivationCode;
use crate::domain::code::models::Code;
use crate::domain::code::models::ResetCode;
use crate::domain::code::ports::CodeRepository;
use crate::domain::errors::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

#[derive(FromRow)]
struct ActivationCodeRow {
    code: String,
    user_id: Uuid,
    expire_at: DateTime<Utc>,
}

impl TryFrom<ActivationCodeRow> for ActivationCode {
    type Error = StoreError;

    fn try_from(r: ActivationCodeRow) -> Result<Self, Self::Error> {
        Ok(ActivationCode {
            code: Code::new(r.code).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            subject: UserId(r.user_id),
            expire_at: r.expire_at,
        })
    }
}

#[derive(FromRow)]
struct ResetCodeRow {
    code: String,
    email: String,
    expire_at: DateTime<Utc>,
}

impl TryFrom<ResetCodeRow> for ResetCode {
    type Error = StoreError;

    fn try_from(r: ResetCodeRow) -> Result<Self, Self::Error> {
        Ok(ResetCode {
            code: Code::new(r.code).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            subject: EmailAddress::new(r.email).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            expire_at: r.expire_at,
        })
    }
}

/// Activation codes, keyed by code and bound to a user id.
pub struct PostgresActivationCodeRepository {
    pool: PgPool,
}

impl PostgresActivationCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeRepository<UserId> for PostgresActivationCodeRepository {
    async fn insert(&self, code: &ActivationCode) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO activation_codes (code, user_id, expire_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(code.code.as_str())
        .bind(code.subject.0)
        .bind(code.expire_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, code: &Code) -> Result<Option<ActivationCode>, StoreError> {
        let row: Option<ActivationCodeRow> = sqlx::query_as(
            "SELECT code, user_id, expire_at FROM activation_codes WHERE code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ActivationCode::try_from).transpose()
    }

    async fn take_unexpired(
        &self,
        code: &Code,
        now: DateTime<Utc>,
    ) -> Result<Option<ActivationCode>, StoreError> {
        let row: Option<ActivationCodeRow> = sqlx::query_as(
            r#"
            DELETE FROM activation_codes
            WHERE code = $1 AND expire_at > $2
            RETURNING code, user_id, expire_at
            "#,
        )
        .bind(code.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ActivationCode::try_from).transpose()
    }

    async fn delete_for_subject(&self, subject: &UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM activation_codes WHERE user_id = $1")
            .bind(subject.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM activation_codes WHERE expire_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Password reset codes, keyed by code and bound to the account email.
pub struct PostgresResetCodeRepository {
    pool: PgPool,
}

impl PostgresResetCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeRepository<EmailAddress> for PostgresResetCodeRepository {
    async fn insert(&self, code: &ResetCode) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reset_codes (code, email, expire_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(code.code.as_str())
        .bind(code.subject.as_str())
        .bind(code.expire_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, code: &Code) -> Result<Option<ResetCode>, StoreError> {
        let row: Option<ResetCodeRow> =
            sqlx::query_as("SELECT code, email, expire_at FROM reset_codes WHERE code = $1")
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(ResetCode::try_from).transpose()
    }

    async fn take_unexpired(
        &self,
        code: &Code,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetCode>, StoreError> {
        let row: Option<ResetCodeRow> = sqlx::query_as(
            r#"
            DELETE FROM reset_codes
            WHERE code = $1 AND expire_at > $2
            RETURNING code, email, expire_at
            "#,
        )
        .bind(code.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ResetCode::try_from).transpose()
    }

    async fn delete_for_subject(&self, subject: &EmailAddress) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM reset_codes WHERE email = $1")
            .bind(subject.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM reset_codes WHERE expire_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
