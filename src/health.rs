use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::state::AppState;

/// Raw database snapshot, deliberately not wrapped in the envelope.
///
/// A snapshot that cannot be serialized is a build defect, so the process
/// exits instead of answering.
pub async fn health(State(state): State<AppState>) -> Response {
    let snapshot = state.store.health().await;
    let body = match serde_json::to_vec(&snapshot) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "health snapshot is not serializable");
            std::process::exit(1);
        }
    };
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
