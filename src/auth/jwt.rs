//! HS256 access/refresh token issuance and verification.

use crate::error::{OAuthError, TokenError};
use crate::models::app_config::{ConfigError, JwtConfig};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime};

/// Custom claims embedded next to the registered ones.
pub type ClaimSet = BTreeMap<String, Value>;

/// Registered claims the issuer owns; caller claims with these names are dropped.
const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub claims: ClaimSet,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_validity: Duration,
    refresh_token_validity: Duration,
}

impl TokenIssuer {
    /// Fails when the secret is not valid base64.
    pub fn new(config: &JwtConfig) -> Result<Self, ConfigError> {
        let encoding_key = EncodingKey::from_base64_secret(&config.secret)
            .map_err(|e| ConfigError::invalid("JWT_SECRET", e))?;
        let decoding_key = DecodingKey::from_base64_secret(&config.secret)
            .map_err(|e| ConfigError::invalid("JWT_SECRET", e))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            access_token_validity: config.access_token_validity,
            refresh_token_validity: config.refresh_token_validity,
        })
    }

    pub fn issue_access_token(&self, subject: &str, claims: &ClaimSet) -> Result<String, OAuthError> {
        self.create_token(subject, claims, self.access_token_validity, OffsetDateTime::now_utc())
    }

    pub fn issue_refresh_token(&self, subject: &str, claims: &ClaimSet) -> Result<String, OAuthError> {
        self.create_token(subject, claims, self.refresh_token_validity, OffsetDateTime::now_utc())
    }

    fn create_token(
        &self,
        subject: &str,
        claims: &ClaimSet,
        validity: Duration,
        issued_at: OffsetDateTime,
    ) -> Result<String, OAuthError> {
        let expires_at = issued_at.checked_add(validity).ok_or_else(|| {
            OAuthError::TokenSigningFailed {
                reason: format!("token validity of {} is out of range", validity),
            }
        })?;

        let body = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            claims: claims
                .iter()
                .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };

        encode(&Header::new(Algorithm::HS256), &body, &self.encoding_key).map_err(|e| {
            OAuthError::TokenSigningFailed {
                reason: e.to_string(),
            }
        })
    }

    /// Verifies signature and expiry (no leeway) and returns the decoded claims.
    pub fn parse_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
