use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Fixed salt for [`PasswordHasher::verify_decoy`]. Its output is never
/// stored or compared.
const DECOY_SALT: &[u8] = b"decoy-salt-0000!";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing implementation.
///
/// Provides salted, slow one-way hashing (Argon2id) with a tunable cost.
/// Hashes are PHC strings, so verification always uses the parameters a
/// hash was created with even after the configured cost changes.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a password hasher with the library's recommended cost.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Create a password hasher with an explicit cost.
    ///
    /// # Errors
    /// * `InvalidCost` - Parameters are outside the ranges Argon2 accepts
    pub fn with_cost(cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password securely.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// The digest comparison is constant-time. A mismatch is `Ok(false)`,
    /// never an error.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash cannot be parsed
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend the same Argon2 work as [`verify`](Self::verify) against a hash
    /// made with this hasher's cost, and discard the result.
    ///
    /// Called when there is no stored hash to check, so the caller's
    /// response time matches a real mismatch.
    pub fn verify_decoy(&self, password: &str) {
        let mut output = [0u8; Params::DEFAULT_OUTPUT_LEN];
        let _ = self
            .argon2
            .hash_password_into(password.as_bytes(), DECOY_SALT, &mut output);
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build hasher")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_same_password_hashes_differ() {
        let hasher = cheap_hasher();

        let first = hasher.hash("pw").expect("Failed to hash password");
        let second = hasher.hash("pw").expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let cheap = cheap_hasher();
        let default = PasswordHasher::new();

        let hash = cheap.hash("pw").expect("Failed to hash password");
        assert!(default.verify("pw", &hash).expect("Failed to verify"));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = cheap_hasher();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_decoy_costs_as_much_as_a_mismatch() {
        let hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 4096,
            iterations: 2,
            parallelism: 1,
        })
        .expect("Failed to build hasher");
        let hash = hasher.hash("right").expect("Failed to hash password");

        let started = Instant::now();
        for _ in 0..3 {
            assert!(!hasher.verify("wrong", &hash).expect("Failed to verify"));
        }
        let mismatch = started.elapsed();

        let started = Instant::now();
        for _ in 0..3 {
            hasher.verify_decoy("wrong");
        }
        let decoy = started.elapsed();

        assert!(mismatch < decoy * 4, "mismatch={:?} decoy={:?}", mismatch, decoy);
        assert!(decoy < mismatch * 4, "mismatch={:?} decoy={:?}", mismatch, decoy);
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = PasswordHasher::with_cost(HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::InvalidCost(_))));
    }
}
