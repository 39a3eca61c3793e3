use crate::state::AppState;
use axum::Router;

pub(crate) mod claims;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
