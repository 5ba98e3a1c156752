use std::fmt;
use std::str::FromStr;

use auth::Role;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserStatusError;

/// User aggregate entity.
///
/// The credential core reads id, email, password hash, role and status, and
/// writes status, password hash, attributes and settings.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub status: UserStatus,
    pub role: Role,
    pub attrs: UserAttrs,
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Trimmed and lower-cased on construction so that lookups and the unique
/// constraint agree. Validated with an RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 255;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `TooLong` - More than 255 characters
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();

        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password with bounded length.
///
/// Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MAX_BYTES: usize = 255;

    /// # Errors
    /// * `Empty` - Zero-length password
    /// * `TooLong` - More than 255 bytes
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        if password.len() > Self::MAX_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max: Self::MAX_BYTES,
                actual: password.len(),
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Account status, persisted as 0/1/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Unconfirmed,
    Active,
    Blocked,
}

impl UserStatus {
    pub fn as_i16(&self) -> i16 {
        match self {
            UserStatus::Unconfirmed => 0,
            UserStatus::Active => 1,
            UserStatus::Blocked => 2,
        }
    }
}

impl TryFrom<i16> for UserStatus {
    type Error = UserStatusError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserStatus::Unconfirmed),
            1 => Ok(UserStatus::Active),
            2 => Ok(UserStatus::Blocked),
            other => Err(UserStatusError::Unknown(other)),
        }
    }
}

/// Profile attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttrs {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub about_me: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub abilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub email_subscriptions: EmailSubscriptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSubscriptions {
    /// Account mail such as password resets
    #[serde(default)]
    pub transactional: bool,
    #[serde(default)]
    pub marketing: bool,
}

/// User view returned to callers: no password hash, no role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: EmailAddress,
    pub attrs: UserAttrs,
    pub status: UserStatus,
    pub settings: UserSettings,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            attrs: user.attrs.clone(),
            status: user.status,
            settings: user.settings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalised() {
        let email = EmailAddress::new("  Alice@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_rejects_invalid() {
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            EmailAddress::new(long),
            Err(EmailError::TooLong { max: 255, .. })
        ));
    }

    #[test]
    fn test_password_bounds() {
        assert_eq!(Password::new(String::new()), Err(PasswordPolicyError::Empty));
        assert!(Password::new("x".repeat(255)).is_ok());
        assert_eq!(
            Password::new("x".repeat(256)),
            Err(PasswordPolicyError::TooLong {
                max: 255,
                actual: 256
            })
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("hunter2".to_string()).unwrap();
        assert_eq!(format!("{:?}", password), "Password(***)");
    }

    #[test]
    fn test_user_status_codes() {
        for status in [UserStatus::Unconfirmed, UserStatus::Active, UserStatus::Blocked] {
            assert_eq!(UserStatus::try_from(status.as_i16()), Ok(status));
        }
        assert_eq!(UserStatus::try_from(7), Err(UserStatusError::Unknown(7)));
    }

    #[test]
    fn test_user_attrs_defaults_from_partial_json() {
        let attrs: UserAttrs = serde_json::from_str(r#"{"first_name":"Ada"}"#).unwrap();
        assert_eq!(attrs.first_name, "Ada");
        assert!(attrs.abilities.is_empty());
    }
}
