use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use super::claims::AccessClaims;
use super::claims::RefreshClaims;
use super::claims::TokenType;
use super::claims::REFRESH_TOKEN_VERSION;
use super::errors::TokenError;
use super::handler::JwtHandler;
use crate::capability::CapabilityRegistry;
use crate::capability::Role;
use crate::clock::Clock;

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSettings {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSettings {
    /// # Errors
    /// * `InvalidSettings` - A TTL is not positive, or the refresh TTL is not
    ///   strictly longer than the access TTL
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, TokenError> {
        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(TokenError::InvalidSettings(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if refresh_ttl <= access_ttl {
            return Err(TokenError::InvalidSettings(format!(
                "refresh token lifetime ({}s) must exceed access token lifetime ({}s)",
                refresh_ttl.num_seconds(),
                access_ttl.num_seconds()
            )));
        }

        Ok(Self {
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

/// Freshly minted access and refresh tokens.
///
/// The refresh token's id and expiry are exposed so that a session store can
/// track it and the transport layer can give its cookie the same lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_id: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues and decodes access/refresh tokens.
///
/// Both tokens are HS256 JWTs signed with the same process-wide key; the
/// `typ` claim keeps one from being accepted as the other.
pub struct TokenCodec {
    handler: JwtHandler,
    registry: Arc<CapabilityRegistry>,
    settings: TokenSettings,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(
        secret: &[u8],
        registry: Arc<CapabilityRegistry>,
        settings: TokenSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            registry,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Mint an access/refresh pair for `subject` with `role`'s capabilities.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_pair(&self, subject: Uuid, role: Role) -> Result<TokenPair, TokenError> {
        let now = self.clock.now();
        let issued_at = now.timestamp();
        let access_expires_at = expiry_instant(now + self.settings.access_ttl);
        let refresh_expires_at = expiry_instant(now + self.settings.refresh_ttl);

        let access_claims = AccessClaims {
            sub: subject,
            exp: access_expires_at.timestamp(),
            iat: issued_at,
            typ: TokenType::Access,
            capabilities: self
                .registry
                .capabilities_for(role)
                .iter()
                .copied()
                .collect(),
        };

        let refresh_claims = RefreshClaims {
            ver: REFRESH_TOKEN_VERSION,
            typ: TokenType::Refresh,
            jti: Uuid::new_v4().simple().to_string(),
            sub: subject,
            exp: refresh_expires_at.timestamp(),
            iat: issued_at,
        };

        Ok(TokenPair {
            access_token: self.handler.encode(&access_claims)?,
            access_expires_at,
            refresh_token: self.handler.encode(&refresh_claims)?,
            refresh_id: refresh_claims.jti,
            refresh_expires_at,
        })
    }

    /// Check an access token's signature and structure.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match
    /// * `Malformed` - Not an access token, or claims are invalid
    pub fn verify_access_token(&self, raw: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = self.handler.decode(raw)?;

        if claims.typ != TokenType::Access {
            return Err(TokenError::Malformed("not an access token".to_string()));
        }

        Ok(claims)
    }

    /// Decompose a refresh token into subject, expiry and id.
    ///
    /// Expiry is not judged here.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match
    /// * `Malformed` - Empty, not a refresh token, or unsupported version
    pub fn parse_refresh_token(&self, raw: &str) -> Result<RefreshClaims, TokenError> {
        if raw.trim().is_empty() {
            return Err(TokenError::Malformed("refresh token is empty".to_string()));
        }

        let claims: RefreshClaims = self.handler.decode(raw)?;

        if claims.typ != TokenType::Refresh {
            return Err(TokenError::Malformed("not a refresh token".to_string()));
        }
        if claims.ver != REFRESH_TOKEN_VERSION {
            return Err(TokenError::Malformed(format!(
                "unsupported refresh token version {}",
                claims.ver
            )));
        }

        Ok(claims)
    }
}

/// Truncate to whole seconds, the resolution of the `exp` claim.
fn expiry_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(instant.timestamp(), 0).unwrap_or(instant)
}
