use std::sync::Arc;

use uuid::Uuid;

use crate::capability::Capability;
use crate::clock::Clock;
use crate::jwt::AccessClaims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;

/// Access token admission errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Access token is malformed: {0}")]
    Malformed(String),

    #[error("Access token signature is invalid")]
    InvalidSignature,

    #[error("Access token expired")]
    Expired,

    #[error("Missing required capabilities: {}", format_capabilities(.missing))]
    Forbidden { missing: Vec<Capability> },
}

impl From<TokenError> for VerifyError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => VerifyError::InvalidSignature,
            TokenError::Malformed(reason) => VerifyError::Malformed(reason),
            other => VerifyError::Malformed(other.to_string()),
        }
    }
}

fn format_capabilities(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Caller admitted by [`CredentialVerifier::authenticate_and_authorize`].
///
/// Can only be built by the verifier, so holding one proves the token was
/// valid and carried the requested capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: Uuid,
    capabilities: Vec<Capability>,
    expires_at: i64,
}

impl Principal {
    pub fn subject(&self) -> Uuid {
        self.subject
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Access token expiry (Unix timestamp).
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// Admission control for protected operations.
///
/// Performs no I/O: signature, expiry and capability checks only.
pub struct CredentialVerifier {
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl CredentialVerifier {
    pub fn new(codec: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }

    /// Validate signature, structure and expiry.
    ///
    /// A token is valid while `now < exp`.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match
    /// * `Malformed` - Token cannot be decoded
    /// * `Expired` - `now >= exp`
    pub fn authenticate(&self, raw: &str) -> Result<AccessClaims, VerifyError> {
        let claims = self.codec.verify_access_token(raw)?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    /// Require every capability in `required` (AND semantics).
    ///
    /// # Errors
    /// * `Forbidden` - At least one required capability is absent
    pub fn authorize(claims: &AccessClaims, required: &[Capability]) -> Result<(), VerifyError> {
        let missing: Vec<Capability> = required
            .iter()
            .filter(|capability| !claims.has_capability(capability))
            .copied()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::Forbidden { missing })
        }
    }

    /// Single admission chokepoint for protected operations.
    pub fn authenticate_and_authorize(
        &self,
        raw: &str,
        required: &[Capability],
    ) -> Result<Principal, VerifyError> {
        let claims = self.authenticate(raw)?;
        Self::authorize(&claims, required)?;

        Ok(Principal {
            subject: claims.sub,
            capabilities: claims.capabilities,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::Duration;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::capability::Action;
    use crate::capability::CapabilityRegistry;
    use crate::capability::Resource;
    use crate::capability::Role;
    use crate::clock::ManualClock;
    use crate::jwt::TokenSettings;

    fn setup() -> (CredentialVerifier, Arc<TokenCodec>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let codec = Arc::new(TokenCodec::new(
            b"test_secret_key_at_least_32_bytes!",
            Arc::new(CapabilityRegistry::new()),
            TokenSettings::new(Duration::minutes(15), Duration::hours(24)).unwrap(),
            clock.clone(),
        ));
        let verifier = CredentialVerifier::new(codec.clone(), clock.clone());
        (verifier, codec, clock)
    }

    fn start() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_authenticate_success() {
        let (verifier, codec, _) = setup();
        let subject = Uuid::new_v4();
        let pair = codec.issue_pair(subject, Role::User).unwrap();

        let claims = verifier.authenticate(&pair.access_token).unwrap();
        assert_eq!(claims.sub, subject);
    }

    #[test]
    fn test_authenticate_expiry_boundary() {
        let (verifier, codec, clock) = setup();
        let pair = codec.issue_pair(Uuid::new_v4(), Role::User).unwrap();
        let expiry = pair.access_expires_at;

        clock.set(expiry - Duration::seconds(1));
        assert!(verifier.authenticate(&pair.access_token).is_ok());

        clock.set(expiry);
        assert_eq!(
            verifier.authenticate(&pair.access_token),
            Err(VerifyError::Expired)
        );

        clock.set(expiry + Duration::seconds(1));
        assert_eq!(
            verifier.authenticate(&pair.access_token),
            Err(VerifyError::Expired)
        );
    }

    #[test]
    fn test_authenticate_invalid_token() {
        let (verifier, _, _) = setup();

        let result = verifier.authenticate("invalid.token.here");
        assert!(matches!(result, Err(VerifyError::Malformed(_))));
    }

    #[test]
    fn test_authenticate_wrong_secret() {
        let (verifier, _, clock) = setup();
        let other = TokenCodec::new(
            b"different_secret_at_least_32_bytes!",
            Arc::new(CapabilityRegistry::new()),
            TokenSettings::new(Duration::minutes(15), Duration::hours(24)).unwrap(),
            clock,
        );
        let pair = other.issue_pair(Uuid::new_v4(), Role::Admin).unwrap();

        assert_eq!(
            verifier.authenticate(&pair.access_token),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn test_authorize_requires_all_capabilities() {
        let (verifier, codec, _) = setup();
        let pair = codec.issue_pair(Uuid::new_v4(), Role::User).unwrap();
        let claims = verifier.authenticate(&pair.access_token).unwrap();

        let attrs = Capability::new(Resource::UserAttrs, Action::Update);
        let users_delete = Capability::new(Resource::Users, Action::Delete);

        assert!(CredentialVerifier::authorize(&claims, &[attrs]).is_ok());
        assert!(CredentialVerifier::authorize(&claims, &[]).is_ok());
        assert_eq!(
            CredentialVerifier::authorize(&claims, &[attrs, users_delete]),
            Err(VerifyError::Forbidden {
                missing: vec![users_delete]
            })
        );
    }

    #[test]
    fn test_authenticate_and_authorize() {
        let (verifier, codec, _) = setup();
        let subject = Uuid::new_v4();
        let pair = codec.issue_pair(subject, Role::Admin).unwrap();
        let users_delete = Capability::new(Resource::Users, Action::Delete);

        let principal = verifier
            .authenticate_and_authorize(&pair.access_token, &[users_delete])
            .unwrap();

        assert_eq!(principal.subject(), subject);
        assert!(principal.capabilities().contains(&users_delete));
        assert_eq!(principal.expires_at(), pair.access_expires_at.timestamp());
    }

    #[test]
    fn test_forbidden_message_lists_missing() {
        let err = VerifyError::Forbidden {
            missing: vec![
                Capability::new(Resource::Users, Action::Read),
                Capability::new(Resource::Users, Action::Delete),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Missing required capabilities: users:read, users:delete"
        );
    }
}
