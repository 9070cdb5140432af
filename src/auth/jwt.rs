use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, Identity};
use crate::{config::TokenConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies HS256 identity tokens with the shared secret.
///
/// Tokens cannot be revoked; one stays valid until `exp`, which with the
/// default TTL of 60000 hours is years away.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl TokenCodec {
    pub fn new(cfg: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "iat", "nbf"]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            ttl: Duration::hours(cfg.ttl_hours),
        }
    }

    pub fn sign(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            id: identity.id,
            username: identity.username.clone(),
            exp: (now + self.ttl).unix_timestamp(),
            iat: now.unix_timestamp(),
            nbf: now.unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Sign)?;
        debug!(user_id = %identity.id, "token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::InvalidToken)?;
        debug!(user_id = %data.claims.id, "token verified");
        Ok(data.claims.into())
    }
}
