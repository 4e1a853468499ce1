use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db::engagement;
use crate::db::posts::{self, NewPost};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::feed::{rank_trending, TRENDING_FEED_LIMIT};
use crate::state::AppState;
use crate::validation::{CommentRequest, CreatePostRequest, ReactionRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/trending", get(trending))
        .route("/posts/{post_id}/comments", post(add_comment))
        .route(
            "/posts/{post_id}/reactions",
            post(react).delete(remove_reaction),
        )
        .route("/posts/{post_id}/favorite", post(toggle_favorite))
}

fn ensure_post_exists(conn: &rusqlite::Connection, post_id: &str) -> AppResult<()> {
    if posts::exists(conn, post_id)? {
        Ok(())
    } else {
        Err(AppError::not_found("No such post exists!"))
    }
}

async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let conn = state.db.get()?;
    let post = posts::create(
        &conn,
        &NewPost {
            title: &req.title,
            description: &req.description,
            code_snippet: &req.code_snippet,
            js_code_snippet: &req.js_code_snippet,
            tags: &req.tags,
            author_id: &user.id,
        },
    )?;

    tracing::debug!("User {} created post {}", user.username, post.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created successfully.",
            "post": post,
        })),
    ))
}

/// Most reacted posts first, already capped for display.
async fn trending(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let ranked = rank_trending(posts::list_with_engagement(&conn)?, TRENDING_FEED_LIMIT);
    Ok(Json(json!({
        "message": "Successfully fetched trending posts!",
        "trendingPosts": ranked,
    })))
}

async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let conn = state.db.get()?;
    ensure_post_exists(&conn, &post_id)?;
    let comment = engagement::create_comment(&conn, &post_id, &user.id, &req.content)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment added successfully.",
            "comment": comment,
        })),
    ))
}

async fn react(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReactionRequest>,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    ensure_post_exists(&conn, &post_id)?;
    let reaction = engagement::upsert_reaction(&conn, &post_id, &user.id, req.kind)?;
    Ok(Json(json!({
        "message": "Reaction saved.",
        "reaction": reaction,
    })))
}

async fn remove_reaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    if !engagement::remove_reaction(&conn, &post_id, &user.id)? {
        return Err(AppError::not_found("Reaction not found"));
    }
    Ok(Json(json!({ "message": "Reaction removed." })))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let mut conn = state.db.get()?;
    ensure_post_exists(&conn, &post_id)?;
    let favorited = engagement::toggle_favorite(&mut conn, &post_id, &user.id)?;
    let message = if favorited {
        "Post added to favorites."
    } else {
        "Post removed from favorites."
    };
    Ok(Json(json!({
        "message": message,
        "favorited": favorited,
    })))
}
