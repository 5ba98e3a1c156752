//! Process-local adapters.
//!
//! Each store is a map behind a single `tokio::sync::Mutex`, so every port
//! operation runs as one critical section and the take-if-valid operations
//! keep their single-winner guarantee.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::code::models::Code;
use crate::domain::code::models::OneTimeCode;
use crate::domain::code::ports::CodeRepository;
use crate::domain::errors::StoreError;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserAttrs;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserSettings;
use crate::domain::user::models::UserStatus;
use crate::domain::user::ports::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<F>(&self, id: &UserId, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| StoreError::RowNotFound(format!("user {}", id)))?;
        apply(user);
        user.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict("users_pkey".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        match users.get_mut(id) {
            Some(user) if user.status == from => {
                user.status = to;
                user.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let password_hash = password_hash.to_string();
        self.modify(id, move |user| user.password_hash = password_hash)
            .await
    }

    async fn update_attrs(&self, id: &UserId, attrs: &UserAttrs) -> Result<(), StoreError> {
        let attrs = attrs.clone();
        self.modify(id, move |user| user.attrs = attrs).await
    }

    async fn update_settings(
        &self,
        id: &UserId,
        settings: &UserSettings,
    ) -> Result<(), StoreError> {
        let settings = settings.clone();
        self.modify(id, move |user| user.settings = settings).await
    }
}

pub struct InMemoryCodeRepository<S> {
    codes: Mutex<HashMap<Code, OneTimeCode<S>>>,
}

impl<S> InMemoryCodeRepository<S> {
    pub fn new() -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored codes, live or expired.
    pub async fn len(&self) -> usize {
        self.codes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.lock().await.is_empty()
    }
}

impl<S> Default for InMemoryCodeRepository<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> CodeRepository<S> for InMemoryCodeRepository<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    async fn insert(&self, code: &OneTimeCode<S>) -> Result<(), StoreError> {
        let mut codes = self.codes.lock().await;
        if codes.contains_key(&code.code) {
            return Err(StoreError::Conflict("code already issued".to_string()));
        }
        codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find(&self, code: &Code) -> Result<Option<OneTimeCode<S>>, StoreError> {
        Ok(self.codes.lock().await.get(code).cloned())
    }

    async fn take_unexpired(
        &self,
        code: &Code,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode<S>>, StoreError> {
        let mut codes = self.codes.lock().await;
        match codes.get(code) {
            Some(stored) if stored.is_valid_at(now) => Ok(codes.remove(code)),
            _ => Ok(None),
        }
    }

    async fn delete_for_subject(&self, subject: &S) -> Result<u64, StoreError> {
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|_, stored| &stored.subject != subject);
        Ok((before - codes.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|_, stored| stored.is_valid_at(now));
        Ok((before - codes.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions held for `user_id`.
    pub async fn count_for(&self, user_id: &UserId) -> usize {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|s| &s.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn record(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict("refresh_sessions_pkey".to_string()));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn consume(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.lock().await.remove(id).is_some())
    }

    async fn revoke_all(&self, user_id: &UserId) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| &s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| now < s.expire_at);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn code(value: &str, subject: UserId, expire_at: DateTime<Utc>) -> OneTimeCode<UserId> {
        OneTimeCode {
            code: Code::new(value.to_string()).unwrap(),
            subject,
            expire_at,
        }
    }

    #[tokio::test]
    async fn test_take_unexpired_leaves_expired_records() {
        let repo = InMemoryCodeRepository::new();
        let stored = code("abc", UserId::new(), at(12));
        repo.insert(&stored).await.unwrap();

        assert_eq!(repo.take_unexpired(&stored.code, at(12)).await.unwrap(), None);
        assert_eq!(repo.len().await, 1);

        assert_eq!(
            repo.take_unexpired(&stored.code, at(11)).await.unwrap(),
            Some(stored.clone())
        );
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let repo = InMemoryCodeRepository::new();
        let stored = code("abc", UserId::new(), at(12));
        repo.insert(&stored).await.unwrap();

        assert!(matches!(
            repo.insert(&stored).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_expired_boundary() {
        let repo = InMemoryCodeRepository::new();
        let subject = UserId::new();
        repo.insert(&code("early", subject, at(10))).await.unwrap();
        repo.insert(&code("exact", subject, at(11))).await.unwrap();
        repo.insert(&code("later", subject, at(12))).await.unwrap();

        assert_eq!(repo.delete_expired(at(11)).await.unwrap(), 2);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_session_consume_once() {
        let repo = InMemorySessionRepository::new();
        let user_id = UserId::new();
        let session = Session {
            id: "jti-1".to_string(),
            user_id,
            expire_at: at(12) + Duration::hours(72),
        };
        repo.record(&session).await.unwrap();

        assert!(repo.consume("jti-1").await.unwrap());
        assert!(!repo.consume("jti-1").await.unwrap());
        assert_eq!(repo.count_for(&user_id).await, 0);
    }

    #[tokio::test]
    async fn test_session_revoke_all() {
        let repo = InMemorySessionRepository::new();
        let user_id = UserId::new();
        let other = UserId::new();
        for (id, owner) in [("a", user_id), ("b", user_id), ("c", other)] {
            repo.record(&Session {
                id: id.to_string(),
                user_id: owner,
                expire_at: at(23),
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.revoke_all(&user_id).await.unwrap(), 2);
        assert_eq!(repo.count_for(&other).await, 1);
    }

    #[tokio::test]
    async fn test_email_conflict() {
        let repo = InMemoryUserRepository::new();
        let email = EmailAddress::new("ada@example.com".to_string()).unwrap();
        let user = User {
            id: UserId::new(),
            email: email.clone(),
            password_hash: "hash".to_string(),
            status: UserStatus::Unconfirmed,
            role: auth::Role::User,
            attrs: UserAttrs::default(),
            settings: UserSettings::default(),
            created_at: at(9),
            updated_at: None,
        };
        repo.create(user.clone()).await.unwrap();

        let duplicate = User {
            id: UserId::new(),
            ..user
        };
        assert_eq!(
            repo.create(duplicate).await,
            Err(StoreError::Conflict("users_email_key".to_string()))
        );
        assert!(repo.find_by_email(&email).await.unwrap().is_some());
    }
}
