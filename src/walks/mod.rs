pub mod distance;
pub mod dto;
pub mod handlers;
pub mod parser;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod timing;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
