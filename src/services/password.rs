use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, PasswordVerifier, Version,
};
use rand::rngs::OsRng;

use crate::config::HashingConfig;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// One-way, salted Argon2id password hashing with a configurable work factor.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(config: &HashingConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a PHC-formatted digest with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(digest) {
            self.argon2()
                .verify_password(plaintext.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let digest = hasher.hash("secret1").unwrap();

        assert_ne!(digest, "secret1");
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("secret1", &digest));
        assert!(!hasher.verify("wrong", &digest));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hasher = fast_hasher();
        let a = hasher.hash("secret1").unwrap();
        let b = hasher.hash("secret1").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_digest() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("secret1", "not-a-phc-string"));
        assert!(!hasher.verify("secret1", ""));
    }

    #[test]
    fn test_invalid_params() {
        let result = CredentialHasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(HashError::InvalidParams(_))));
    }
}
