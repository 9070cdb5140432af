use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
mod jwt;
mod password;

pub use extractors::AuthUser;
pub use jwt::{TokenCodec, TokenError};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
