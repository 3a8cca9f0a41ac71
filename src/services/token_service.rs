use crate::config::{AuthConfig, ConfigError};
use crate::error::ErrorKind;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::password::CredentialHasher;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Claims carried by every issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String, // Issuer
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
    pub aud: String, // Login the token was issued to
    pub jti: i64,    // User id
}

#[derive(Debug, thiserror::Error)]
pub enum TokenServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Error while signing the token: {0}")]
    Signing(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl TokenServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenServiceError::InvalidCredentials | TokenServiceError::InvalidToken(_) => {
                ErrorKind::Unauthorized
            }
            TokenServiceError::Signing(_) | TokenServiceError::Repository(_) => {
                ErrorKind::Unavailable
            }
        }
    }
}

pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Issues and verifies HS256 bearer tokens signed with the shared secret.
pub struct TokenService {
    user_repository: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        hasher: CredentialHasher,
        config: &AuthConfig,
    ) -> Result<Self, ConfigError> {
        let ttl = Duration::try_hours(config.token_ttl_hours).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "auth.token_ttl_hours out of range: {}",
                config.token_ttl_hours
            ))
        })?;

        Ok(Self {
            user_repository,
            hasher,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl,
        })
    }

    /// Checks the login and password, then mints a token for that user.
    pub async fn issue(&self, request: LoginRequest) -> Result<String, TokenServiceError> {
        let user = self
            .user_repository
            .find_by_login(&request.login)
            .await?
            .ok_or(TokenServiceError::InvalidCredentials)?;

        if !self.hasher.verify(&request.password, &user.password_hash) {
            tracing::debug!(login = %request.login, "password mismatch");
            return Err(TokenServiceError::InvalidCredentials);
        }

        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenServiceError::Signing("token expiry out of range".to_string()))?;
        let claims = Claims {
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            aud: user.login,
            jti: user.id,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenServiceError::Signing(e.to_string()))
    }

    /// Validates signature, issuer and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        // Audience is the per-user login, not a fixed service name
        validation.validate_aud = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenServiceError::InvalidToken(e.to_string()))
    }
}
