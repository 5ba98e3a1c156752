//! Credential primitives library
//!
//! Transport- and storage-agnostic building blocks for the account service:
//! - Password hashing (Argon2id, tunable cost)
//! - Role to capability registry
//! - Access/refresh token codec (HS256 JWT)
//! - Credential verification (signature, expiry, capabilities)
//! - One-time code generation
//! - Injectable clock
//!
//! Nothing here performs I/O. Services own persistence and compose these
//! pieces into flows.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Issuing and Verifying Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Action, Capability, CapabilityRegistry, CredentialVerifier, Resource, Role};
//! use auth::{SystemClock, TokenCodec, TokenSettings};
//! use chrono::Duration;
//!
//! let clock = Arc::new(SystemClock);
//! let settings = TokenSettings::new(Duration::minutes(15), Duration::hours(72)).unwrap();
//! let codec = Arc::new(TokenCodec::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Arc::new(CapabilityRegistry::new()),
//!     settings,
//!     clock.clone(),
//! ));
//!
//! let pair = codec.issue_pair(uuid::Uuid::new_v4(), Role::User).unwrap();
//!
//! let verifier = CredentialVerifier::new(codec, clock);
//! let required = [Capability::new(Resource::UserAttrs, Action::Update)];
//! let principal = verifier
//!     .authenticate_and_authorize(&pair.access_token, &required)
//!     .unwrap();
//! println!("Admitted {}", principal.subject());
//! ```

pub mod capability;
pub mod clock;
pub mod code;
pub mod jwt;
pub mod password;
pub mod verifier;

// Re-export commonly used items
pub use capability::Action;
pub use capability::Capability;
pub use capability::CapabilityError;
pub use capability::CapabilityRegistry;
pub use capability::CapabilitySet;
pub use capability::Resource;
pub use capability::Role;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use code::CodeFormatError;
pub use code::CodeGenerator;
pub use code::CodeGeneratorError;
pub use jwt::AccessClaims;
pub use jwt::RefreshClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use jwt::TokenPair;
pub use jwt::TokenSettings;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use verifier::CredentialVerifier;
pub use verifier::Principal;
pub use verifier::VerifyError;
