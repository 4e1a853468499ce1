use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db::contact::{self, NewContactMessage};
use crate::error::AppResult;
use crate::extractors::ValidatedJson;
use crate::state::AppState;
use crate::validation::ContactRequest;

pub fn router() -> Router<AppState> {
    Router::new().route("/contact", post(send_message))
}

async fn send_message(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let conn = state.db.get()?;
    let id = contact::create(
        &conn,
        &NewContactMessage {
            name: &req.name,
            email: &req.email,
            subject: &req.subject,
            message: &req.message,
        },
    )?;

    tracing::info!("Contact message {} received from {}", id, req.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Your message has been sent." })),
    ))
}
