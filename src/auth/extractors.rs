use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::Identity, jwt::TokenCodec};
use crate::error::ApiError;

pub const BAD_AUTH_HEADER: &str = "Invalid Authorization header format";
pub const BAD_TOKEN: &str = "Invalid token";

/// Requires `Authorization: Bearer <token>` and yields the verified identity.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenCodec>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let token = match header.split_once(' ') {
            Some(("Bearer", token)) => token,
            _ => {
                warn!("missing or malformed Authorization header");
                return Err(ApiError::Unauthorized(BAD_AUTH_HEADER));
            }
        };

        let codec = Arc::<TokenCodec>::from_ref(state);
        let identity = codec.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthorized(BAD_TOKEN)
        })?;

        Ok(AuthUser(identity))
    }
}
