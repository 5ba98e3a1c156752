use std::str::FromStr;

use async_trait::async_trait;
use auth::Role;
use chrono::DateTime;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserAttrs;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserSettings;
use crate::domain::user::models::UserStatus;
use crate::domain::user::ports::UserRepository;

const USER_COLUMNS: &str = r#"
    id, email, password_hash, status, role, attrs, settings, created_at, updated_at
"#;

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    status: i16,
    role: String,
    attrs: Json<UserAttrs>,
    settings: Json<UserSettings>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(r.id),
            email: EmailAddress::new(r.email).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            password_hash: r.password_hash,
            status: UserStatus::try_from(r.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            role: Role::from_str(&r.role).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            attrs: r.attrs.0,
            settings: r.settings.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, status, role, attrs, settings, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.status.as_i16())
        .bind(user.role.as_str())
        .bind(Json(&user.attrs))
        .bind(Json(&user.settings))
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.0)
        .bind(from.as_i16())
        .bind(to.as_i16())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        expect_one_row(result.rows_affected(), id)
    }

    async fn update_attrs(&self, id: &UserId, attrs: &UserAttrs) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET attrs = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(Json(attrs))
        .execute(&self.pool)
        .await?;

        expect_one_row(result.rows_affected(), id)
    }

    async fn update_settings(
        &self,
        id: &UserId,
        settings: &UserSettings,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET settings = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(Json(settings))
        .execute(&self.pool)
        .await?;

        expect_one_row(result.rows_affected(), id)
    }
}

fn expect_one_row(rows_affected: u64, id: &UserId) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::RowNotFound(format!("user {}", id)));
    }
    Ok(())
}
