pub mod admin;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod routes;
pub mod state;
pub mod validation;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::state::AppState;

/// The complete HTTP application with logging and CORS applied.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    let mut app = routes::router().layer(TraceLayer::new_for_http());
    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    app.with_state(state)
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
