use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use super::report::{self, REPORT_FILENAME};
use super::stats;
use crate::auth::password::verify_password;
use crate::db::{contact, engagement, posts, users};
use crate::error::{AppError, AppResult};
use crate::extractors::{AdminUser, ValidatedJson};
use crate::state::AppState;
use crate::validation::{LoginRequest, UpdatePostRequest};

/// PDF bytes served as a file download.
pub struct PdfAttachment {
    pub filename: &'static str,
    pub bytes: Vec<u8>,
}

impl IntoResponse for PdfAttachment {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.filename),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

// -- Auth --

/// POST /admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Json<Value>> {
    let admin = {
        let conn = state.db.get()?;
        users::find_admin_by_email(&conn, &req.email)?
    }
    .ok_or_else(|| AppError::unauthorized("No such admin exists"))?;

    if !verify_password(&req.password, &admin.password_hash) {
        return Err(AppError::unauthorized("Wrong Password"));
    }
    if admin.blocked {
        return Err(AppError::forbidden("Your account has been blocked"));
    }

    let token = state.tokens.issue(&admin.id, admin.is_admin)?;

    tracing::info!("Admin {} logged in", admin.username);
    Ok(Json(json!({
        "message": "Admin logged in Successfully.",
        "token": token,
    })))
}

/// GET /admin/profile
pub async fn admin_profile(AdminUser(admin): AdminUser) -> Json<Value> {
    Json(json!({
        "user": {
            "id": admin.id,
            "email": admin.email,
            "isAdmin": admin.is_admin,
        }
    }))
}

// -- Moderation --

fn set_blocked(
    state: &AppState,
    admin: &str,
    user_id: &str,
    blocked: bool,
) -> AppResult<Json<Value>> {
    let username = {
        let conn = state.db.get()?;
        users::set_blocked(&conn, user_id, blocked)?
    }
    .ok_or_else(|| AppError::not_found("User not found"))?;

    let verb = if blocked { "blocked" } else { "unblocked" };
    tracing::info!("Admin {} {} user {}", admin, verb, username);
    Ok(Json(json!({
        "message": format!("User {} has been {}.", username, verb),
    })))
}

/// PATCH /admin/users/{user_id}/block
pub async fn block_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    set_blocked(&state, &admin.username, &user_id, true)
}

/// PATCH /admin/users/{user_id}/unblock
pub async fn unblock_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    set_blocked(&state, &admin.username, &user_id, false)
}

/// PUT /admin/posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> AppResult<Json<Value>> {
    let updated = {
        let conn = state.db.get()?;
        posts::update(&conn, &post_id, &req.into())?
    }
    .ok_or_else(|| AppError::not_found("Post not found!"))?;

    tracing::info!("Admin {} updated post {}", admin.username, post_id);
    Ok(Json(json!({
        "message": "Post updated successfully.",
        "updatedPost": updated,
    })))
}

/// DELETE /admin/posts/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = {
        let mut conn = state.db.get()?;
        posts::delete_with_children(&mut conn, &post_id)?
    };
    if !deleted {
        return Err(AppError::not_found("Post not found"));
    }

    tracing::info!("Admin {} deleted post {}", admin.username, post_id);
    Ok(Json(json!({ "message": "Post deleted successfully." })))
}

/// DELETE /admin/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(comment_id): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = {
        let conn = state.db.get()?;
        engagement::delete_comment(&conn, &comment_id)?
    };
    if !deleted {
        return Err(AppError::not_found("Comment not found"));
    }

    tracing::info!("Admin {} deleted comment {}", admin.username, comment_id);
    Ok(Json(json!({ "message": "Comment deleted successfully." })))
}

// -- Listings --

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let all_users = users::list_moderated(&conn)?;
    Ok(Json(json!({
        "message": "Successfully fetched All Users!",
        "allUsers": all_users,
    })))
}

/// GET /admin/posts
pub async fn list_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let posts = posts::list_for_admin(&conn)?;
    Ok(Json(json!({ "posts": posts })))
}

/// GET /admin/posts/trending
pub async fn list_trending_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let trending_posts = posts::list_with_engagement(&conn)?;
    Ok(Json(json!({
        "message": "Successfully fetched trending posts!",
        "trendingPosts": trending_posts,
    })))
}

/// GET /admin/posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let post = {
        let conn = state.db.get()?;
        posts::find_details(&conn, &post_id)?
    }
    .ok_or_else(|| AppError::not_found("No such post exists!"))?;

    Ok(Json(json!({ "post": post })))
}

/// GET /admin/contact-messages
pub async fn list_contact_messages(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let messages = contact::list(&conn)?;
    Ok(Json(json!({
        "message": "Successfully fetched contact messages!",
        "contactMessage": messages,
    })))
}

/// GET /admin/reactions
pub async fn list_reactions(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let reactions = engagement::list_reaction_activity(&conn)?;
    Ok(Json(json!({
        "message": "Successfully fetched all reactions!",
        "reactions": reactions,
    })))
}

/// GET /admin/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let favorites = engagement::list_favorite_activity(&conn)?;
    Ok(Json(json!({
        "message": "Successfully fetched favorite posts!",
        "favorites": favorites,
    })))
}

// -- Statistics --

/// GET /admin/stats
pub async fn admin_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<stats::AdminStats>> {
    let conn = state.db.get()?;
    Ok(Json(stats::collect_stats(&conn)?))
}

/// GET /admin/stats/graphs
pub async fn graph_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<stats::GraphSeries>> {
    let conn = state.db.get()?;
    Ok(Json(stats::collect_graph_series(&conn)?))
}

/// GET /admin/report
pub async fn download_report(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<PdfAttachment> {
    let snapshot = {
        let conn = state.db.get()?;
        stats::collect_report_snapshot(&conn, Utc::now().date_naive())?
    };
    let bytes = report::render(&snapshot)?;

    tracing::info!(
        "Admin {} downloaded report ({} bytes)",
        admin.username,
        bytes.len()
    );
    Ok(PdfAttachment {
        filename: REPORT_FILENAME,
        bytes,
    })
}
