use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// A JSON request body that knows which message to answer with when it is unusable.
pub trait RequestBody: DeserializeOwned {
    const INVALID: &'static str;
}

/// Like `axum::Json`, but malformed bodies become a 400 envelope and the
/// content type is not checked.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: RequestBody,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::Validation(T::INVALID))?;
        decode(&body).map(JsonBody)
    }
}

pub fn decode<T: RequestBody>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body_size = body.len(), "json body rejected");
        ApiError::Validation(T::INVALID)
    })
}
