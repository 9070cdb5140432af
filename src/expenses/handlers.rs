use axum::{
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::dto::{
    ExpenseRequest, ExpenseResponse, ListQuery, TimeFilter, BAD_FILTER_REQUEST, BAD_LIST_QUERY,
};
use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::{decode, JsonBody},
    response::{respond, EXPENSE_ADDED, EXPENSE_UPDATED, SUCCESS},
    state::AppState,
    store::CreatedWindow,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(add_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

#[instrument(skip(state, payload))]
pub async fn add_expense(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonBody(payload): JsonBody<ExpenseRequest>,
) -> Result<Response, ApiError> {
    let fields = payload.into_fields()?;
    let expense = state.store.create_expense(identity.id, fields).await?;

    info!(user_id = %identity.id, expense_id = %expense.id, "expense added");
    Ok(respond(
        StatusCode::CREATED,
        EXPENSE_ADDED,
        Some(ExpenseResponse::from(expense)),
    ))
}

/// `?filterTime=fixed` reads `{"start": "past_week" | ...}` from the body,
/// `?filterTime=custom` reads `{"start": rfc3339, "end"?: rfc3339}`;
/// anything else lists everything.
#[instrument(skip(state, body))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) = query.map_err(|e| {
        debug!(error = %e, "query string rejected");
        ApiError::Validation(BAD_LIST_QUERY)
    })?;
    let body = body.map_err(|e| {
        debug!(error = %e, "list body rejected");
        ApiError::Validation(BAD_FILTER_REQUEST)
    })?;
    let query = ListQuery::from_pairs(pairs);

    let now = OffsetDateTime::now_utc();
    let window: Option<CreatedWindow> = match query.filter_time.as_deref() {
        Some("fixed") => Some(filter_body(&body)?.fixed_window(now)),
        Some("custom") => Some(filter_body(&body)?.custom_window(now)?),
        _ => None,
    };
    debug!(?window, "listing expenses");

    let rows = state.store.list_expenses(identity.id, window).await?;
    let items: Vec<ExpenseResponse> = rows.into_iter().map(ExpenseResponse::from).collect();
    Ok(respond(StatusCode::OK, SUCCESS, Some(items)))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ExpenseRequest>,
) -> Result<Response, ApiError> {
    let fields = payload.into_fields()?;
    let id = owned_id(&id)?;

    let expense = state
        .store
        .update_expense(identity.id, id, fields)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(user_id = %identity.id, expense_id = %expense.id, "expense updated");
    Ok(respond(
        StatusCode::OK,
        EXPENSE_UPDATED,
        Some(ExpenseResponse::from(expense)),
    ))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = owned_id(&id)?;

    let expense = state
        .store
        .delete_expense(identity.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(user_id = %identity.id, expense_id = %expense.id, "expense deleted");
    Ok(respond(
        StatusCode::OK,
        SUCCESS,
        Some(ExpenseResponse::from(expense)),
    ))
}

/// An id that cannot name any row is reported like an unowned one.
fn owned_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// An empty body means "no filter fields given".
fn filter_body(body: &[u8]) -> Result<TimeFilter, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TimeFilter::default());
    }
    decode(body)
}
