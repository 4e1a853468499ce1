use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::auth::password::{hash_password, verify_password};
use crate::db;
use crate::db::models::User;
use crate::db::users::{self, NewUser};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;
use crate::validation::{LoginRequest, SignupRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/signin", post(signin))
        .route("/users/me", get(me))
}

async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let conn = state.db.get()?;
    if users::email_or_username_taken(&conn, &req.email, &req.username)? {
        return Err(duplicate_account());
    }

    let password_hash = hash_password(&req.password, state.config.auth.bcrypt_cost)?;
    let user = create_account(&conn, &req, &password_hash)?;
    let token = state.tokens.issue(&user.id, user.is_admin)?;

    tracing::info!("New user registered: {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully.",
            "token": token,
        })),
    ))
}

fn duplicate_account() -> AppError {
    AppError::Conflict("A user with that email or username already exists".to_string())
}

/// Insert the account. A concurrent signup that slipped past the
/// availability check surfaces as a unique violation and maps to 409.
fn create_account(conn: &Connection, req: &SignupRequest, password_hash: &str) -> AppResult<User> {
    let new_user = NewUser {
        email: &req.email,
        username: &req.username,
        password_hash,
        is_admin: false,
    };
    match users::create(conn, &new_user) {
        Ok(user) => Ok(user),
        Err(e) if db::is_unique_violation(&e) => Err(duplicate_account()),
        Err(e) => Err(e.into()),
    }
}

async fn signin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Json<Value>> {
    let user = {
        let conn = state.db.get()?;
        users::find_by_email(&conn, &req.email)?
    };
    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => return Err(AppError::unauthorized("Invalid email or password")),
    };
    if user.blocked {
        return Err(AppError::forbidden("Your account has been blocked"));
    }

    let token = state.tokens.issue(&user.id, user.is_admin)?;
    Ok(Json(json!({
        "message": "User logged in successfully.",
        "token": token,
    })))
}

async fn me(user: CurrentUser) -> Json<Value> {
    Json(json!({
        "user": {
            "id": user.id,
            "email": user.email,
            "username": user.username,
            "isAdmin": user.is_admin,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;

    fn signup_request(email: &str, username: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "hunter22".to_string(),
        }
    }

    #[test]
    fn racing_duplicate_signup_is_a_conflict() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        // Inserted after the availability check would have passed
        insert_user(&conn, "u1", "alice", false);

        let req = signup_request("alice@example.com", "alice2");
        let err = create_account(&conn, &req, "hash").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let req = signup_request("other@example.com", "alice");
        let err = create_account(&conn, &req, "hash").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn fresh_account_is_created() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        let req = signup_request("dana@example.com", "dana");
        let user = create_account(&conn, &req, "hash").unwrap();
        assert_eq!(user.username, "dana");
        assert!(!user.is_admin);
    }
}
