use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{User, Users, STATUS_ACTIVE};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
