use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::admin::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(handlers::admin_login))
        .route("/admin/profile", get(handlers::admin_profile))
        .route("/admin/users", get(handlers::list_users))
        .route("/admin/users/{user_id}/block", patch(handlers::block_user))
        .route("/admin/users/{user_id}/unblock", patch(handlers::unblock_user))
        .route("/admin/posts", get(handlers::list_posts))
        .route("/admin/posts/trending", get(handlers::list_trending_posts))
        .route(
            "/admin/posts/{post_id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/admin/comments/{comment_id}", delete(handlers::delete_comment))
        .route("/admin/contact-messages", get(handlers::list_contact_messages))
        .route("/admin/reactions", get(handlers::list_reactions))
        .route("/admin/favorites", get(handlers::list_favorites))
        .route("/admin/stats", get(handlers::admin_stats))
        .route("/admin/stats/graphs", get(handlers::graph_stats))
        .route("/admin/report", get(handlers::download_report))
}
