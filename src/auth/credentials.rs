use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, PasswordHash, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::instrument;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid hash parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error(transparent)]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id password hashing. Both operations run on the blocking pool.
#[derive(Clone)]
pub struct CredentialService {
    params: Params,
}

impl CredentialService {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, CredentialError> {
        Self::new(config.hash_memory_kib, config.hash_iterations)
    }

    fn hasher(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Salted one-way hash in PHC string format
    #[instrument(skip_all)]
    pub async fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::hasher(params)
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| CredentialError::Hash(e.to_string()))
        })
        .await?
    }

    /// `Ok(false)` on mismatch. The cost parameters are read from the stored
    /// hash, so hashes made under an older work factor still verify.
    #[instrument(skip_all)]
    pub async fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, CredentialError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();
        let stored = stored.to_owned();
        tokio::task::spawn_blocking(move || -> Result<bool, CredentialError> {
            let parsed = PasswordHash::new(&stored).map_err(|e| CredentialError::MalformedHash(e.to_string()))?;
            Ok(Self::hasher(params)
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        CredentialService::new(8, 1).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let svc = service();
        let hash = svc.hash("s3cret").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("s3cret"));
        assert!(svc.verify("s3cret", &hash).await.unwrap());
        assert!(!svc.verify("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let svc = service();
        let a = svc.hash("same").await.unwrap();
        let b = svc.hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn verifies_hashes_made_with_other_costs() {
        let hash = CredentialService::new(16, 2).unwrap().hash("pw").await.unwrap();
        assert!(service().verify("pw", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let err = service().verify("pw", "plaintext-password").await.unwrap_err();
        assert!(matches!(err, CredentialError::MalformedHash(_)));
    }

    #[test]
    fn rejects_impossible_params() {
        assert!(matches!(
            CredentialService::new(1, 0),
            Err(CredentialError::InvalidParams(_))
        ));
    }
}
