use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::capability::Capability;

/// Current refresh token format version.
pub const REFRESH_TOKEN_VERSION: u8 = 1;

/// Discriminates access and refresh tokens signed with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// Subject (user identifier)
    pub sub: Uuid,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    pub typ: TokenType,

    /// Capabilities derived from the subject's role at issuance
    pub capabilities: Vec<Capability>,
}

impl AccessClaims {
    /// Check if token is expired.
    ///
    /// A token is valid while `now < exp`; at `now == exp` it is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Claims carried by a refresh token.
///
/// `jti` is a random identifier that lets a server-side session store track
/// and revoke individual refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Format version
    pub ver: u8,

    pub typ: TokenType,

    /// Random token identifier
    pub jti: String,

    /// Subject (user identifier)
    pub sub: Uuid,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl RefreshClaims {
    /// Same boundary policy as access tokens: valid while `now < exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Action;
    use crate::capability::Resource;

    #[test]
    fn test_is_expired_boundary() {
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            exp: 1000,
            iat: 900,
            typ: TokenType::Access,
            capabilities: vec![],
        };

        assert!(!claims.is_expired(999)); // Not expired
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001)); // Expired
    }

    #[test]
    fn test_access_claims_wire_format() {
        let claims = AccessClaims {
            sub: Uuid::nil(),
            exp: 1000,
            iat: 900,
            typ: TokenType::Access,
            capabilities: vec![Capability::new(Resource::UserAttrs, Action::Update)],
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["typ"], "access");
        assert_eq!(json["capabilities"][0], "user_attrs:update");
        assert_eq!(json["sub"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_refresh_claims_expiry_instant() {
        let claims = RefreshClaims {
            ver: REFRESH_TOKEN_VERSION,
            typ: TokenType::Refresh,
            jti: "abc".to_string(),
            sub: Uuid::new_v4(),
            exp: 1_700_000_000,
            iat: 1_699_000_000,
        };

        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
        assert!(!claims.is_expired(1_699_999_999));
        assert!(claims.is_expired(1_700_000_000));
    }
}
