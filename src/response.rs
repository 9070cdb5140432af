use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const USER_ADDED: &str = "user added";
pub const LOGGED_IN: &str = "logged in";
pub const EXPENSE_ADDED: &str = "expense added";
pub const EXPENSE_UPDATED: &str = "expense updated";
pub const SUCCESS: &str = "success";

/// Body shape shared by every JSON endpoint: `{"message": ..., "data"?: ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    let body = Envelope {
        message: message.to_string(),
        data,
    };
    (status, Json(body)).into_response()
}

/// Envelope without a payload.
pub fn message(status: StatusCode, message: &str) -> Response {
    respond::<()>(status, message, None)
}
