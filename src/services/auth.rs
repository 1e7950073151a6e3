// JWT issuance and validation (HS256 access + refresh tokens).

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::JwtConfig;
use crate::models::User;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub role: String,
    pub token_type: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Access + refresh pair returned by login, register and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry_seconds: u64,
    refresh_expiry_seconds: u64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            expiry_seconds: config.expiry_seconds,
            refresh_expiry_seconds: config.refresh_expiry_seconds,
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        self.issue(user, TOKEN_TYPE_ACCESS, self.expiry_seconds)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, AuthError> {
        self.issue(user, TOKEN_TYPE_REFRESH, self.refresh_expiry_seconds)
    }

    pub fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            token: self.issue_token(user)?,
            refresh_token: self.issue_refresh_token(user)?,
        })
    }

    fn issue(&self, user: &User, token_type: &str, expiry: u64) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            company_id: user.company_id,
            email: user.email.clone(),
            role: user.role.clone(),
            token_type: token_type.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + expiry as i64,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate a bearer (access) token. Refresh tokens are rejected here.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate(token, TOKEN_TYPE_ACCESS)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate(token, TOKEN_TYPE_REFRESH)
    }

    fn validate(&self, token: &str, expected_type: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)?;

        if claims.token_type != expected_type {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config(secret: &str, issuer: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiry_seconds: 3600,
            refresh_expiry_seconds: 604_800,
            issuer: issuer.to_string(),
        }
    }

    fn service() -> JwtService {
        JwtService::new(&config(
            "test-secret-at-least-32-bytes-long!!",
            "leadflow-backend",
        ))
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "ops@acme.test".to_string(),
            password_hash: "hash".to_string(),
            role: "admin".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = service();
        let user = user();
        let token = service.issue_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.company_id, user.company_id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_refresh_round_trip() {
        let service = service();
        let user = user();
        let pair = service.issue_token_pair(&user).unwrap();
        let claims = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_refresh_token_is_not_a_bearer_token() {
        let service = service();
        let refresh = service.issue_refresh_token(&user()).unwrap();
        assert!(service.validate_token(&refresh).is_err());
    }

    #[test]
    fn test_access_token_cannot_refresh() {
        let service = service();
        let access = service.issue_token(&user()).unwrap();
        assert!(service.validate_refresh_token(&access).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = service();
        let token = service.issue_token(&user()).unwrap();
        let tampered = format!("{}x", token);
        assert!(service.validate_token(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = service().issue_token(&user()).unwrap();
        let other = JwtService::new(&config(
            "a-completely-different-secret-value!",
            "leadflow-backend",
        ));
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let token = service().issue_token(&user()).unwrap();
        let other = JwtService::new(&config(
            "test-secret-at-least-32-bytes-long!!",
            "someone-else",
        ));
        assert!(other.validate_token(&token).is_err());
    }
}
