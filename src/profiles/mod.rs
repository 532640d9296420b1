mod dto;
pub mod handlers;
pub mod model;
mod services;

use crate::state::AppState;
use axum::Router;

pub(crate) use dto::MessageResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
