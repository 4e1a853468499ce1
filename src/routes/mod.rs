pub mod admin;
pub mod contact;
pub mod posts;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Path prefix for every API route.
pub const API_PREFIX: &str = "/api/v1";

pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(admin::router())
        .merge(users::router())
        .merge(posts::router())
        .merge(contact::router());

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api)
}

async fn health() -> &'static str {
    "ok"
}
