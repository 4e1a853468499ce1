use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::db::models::User;
use crate::db::users;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller of a user-facing endpoint.
/// Returns 401 without a valid token and 403 for blocked accounts.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser {
            id: user.id,
            email: user.email,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if user.blocked {
            return Err(AppError::forbidden("Your account has been blocked"));
        }
        Ok(user.into())
    }
}

/// An administrator. The admin flag is re-read from the database on every
/// request, so revoking it takes effect before the token expires.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.is_admin {
            return Err(AppError::forbidden("Admin access required"));
        }
        if user.blocked {
            return Err(AppError::forbidden("Your account has been blocked"));
        }
        Ok(AdminUser(user.into()))
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let token = extract_bearer_token(parts)
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| AppError::unauthorized("Invalid token"))?;

    let conn = state.db.get()?;
    users::find_by_id(&conn, &claims.id)?.ok_or_else(|| AppError::unauthorized("Invalid token"))
}

fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JSON body that has passed its `validator` schema.
/// Malformed JSON is a 400; schema failures carry per-field messages.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_is_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_header_yields_none() {
        let parts = parts_with_auth(None);
        assert_eq!(extract_bearer_token(&parts), None);
    }

    #[test]
    fn other_schemes_are_ignored() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&parts), None);
    }

    #[test]
    fn empty_bearer_is_ignored() {
        let parts = parts_with_auth(Some("Bearer   "));
        assert_eq!(extract_bearer_token(&parts), None);
    }
}
