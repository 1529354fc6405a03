use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{FieldEnum, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: Uuid,
    pub role: String,
    pub shelter_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// `None` when the token names a role this service does not know
    pub fn known_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiry_hours)
    }

    pub fn issue(&self, id: Uuid, role: Role, shelter_id: Uuid) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            role: role.as_str().to_string(),
            shelter_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(SessionError::Signing)
    }

    /// Checks signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(SessionError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_to_the_same_claims() {
        let issuer = SessionIssuer::new("test-secret", 24);
        let (id, shelter) = (Uuid::new_v4(), Uuid::new_v4());
        let token = issuer.issue(id, Role::SuperAdmin, shelter).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.role, "super-admin");
        assert_eq!(claims.known_role(), Some(Role::SuperAdmin));
        assert_eq!(claims.shelter_id, shelter);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let token = SessionIssuer::new("one", 24)
            .issue(Uuid::new_v4(), Role::ShelterAdmin, Uuid::new_v4())
            .unwrap();
        assert!(SessionIssuer::new("two", 24).verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let issuer = SessionIssuer::new("test-secret", -2);
        let token = issuer
            .issue(Uuid::new_v4(), Role::ShelterAdmin, Uuid::new_v4())
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn rejects_garbage() {
        let issuer = SessionIssuer::new("test-secret", 24);
        assert!(issuer.verify("not.a.token").is_err());
    }
}
