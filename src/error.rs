use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{auth::TokenError, response, store::StoreError};

pub const INTERNAL_ERROR: &str = "internal server error";

/// Every failure a handler can produce. Rendered as the standard envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("email already registered, use another email")]
    Conflict,
    #[error("cannot find the entry")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::DuplicateEmail => ApiError::Conflict,
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(inner: TokenError) -> Self {
        ApiError::Internal(anyhow::Error::new(inner))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Internal(e) => {
                error!(error = %format!("{e:#}"), "request failed");
                response::message(status, INTERNAL_ERROR)
            }
            other => response::message(status, &other.to_string()),
        }
    }
}
