//! Shared harness for driving the full router against a temporary database.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use styleshare::auth::password::hash_password;
use styleshare::auth::TokenSigner;
use styleshare::config::Config;
use styleshare::db::models::ReactionType;
use styleshare::db::posts::NewPost;
use styleshare::db::users::NewUser;
use styleshare::db::{self, engagement, posts, users};
use styleshare::state::{AppState, DbPool};

pub const PASSWORD: &str = "hunter22";

pub struct TestApp {
    _dir: TempDir,
    pub pool: DbPool,
    pub tokens: TokenSigner,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::create_pool(&dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();

        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        let tokens = TokenSigner::new(b"test-secret", config.auth.token_hours).unwrap();
        let router = styleshare::app(AppState::new(pool.clone(), config, tokens.clone()));

        TestApp {
            _dir: dir,
            pool,
            tokens,
            router,
        }
    }

    pub fn create_user(&self, username: &str, is_admin: bool) -> String {
        let hash = hash_password(PASSWORD, 4).unwrap();
        let conn = self.pool.get().unwrap();
        let email = format!("{}@example.com", username);
        users::create(
            &conn,
            &NewUser {
                email: &email,
                username,
                password_hash: &hash,
                is_admin,
            },
        )
        .unwrap()
        .id
    }

    pub fn token_for(&self, user_id: &str, is_admin: bool) -> String {
        self.tokens.issue(user_id, is_admin).unwrap()
    }

    /// Admin account plus a token for it.
    pub fn admin(&self) -> (String, String) {
        let id = self.create_user("admin", true);
        let token = self.token_for(&id, true);
        (id, token)
    }

    pub fn create_post(&self, author_id: &str, title: &str) -> String {
        let conn = self.pool.get().unwrap();
        let tags = vec!["css".to_string()];
        posts::create(
            &conn,
            &NewPost {
                title,
                description: "A neat effect",
                code_snippet: ".glow { color: red; }",
                js_code_snippet: "",
                tags: &tags,
                author_id,
            },
        )
        .unwrap()
        .id
    }

    pub fn add_comment(&self, post_id: &str, user_id: &str) -> String {
        let conn = self.pool.get().unwrap();
        engagement::create_comment(&conn, post_id, user_id, "Nice!")
            .unwrap()
            .id
    }

    pub fn add_reaction(&self, post_id: &str, user_id: &str) {
        let conn = self.pool.get().unwrap();
        engagement::upsert_reaction(&conn, post_id, user_id, ReactionType::Like).unwrap();
    }

    pub fn add_favorite(&self, post_id: &str, user_id: &str) {
        let mut conn = self.pool.get().unwrap();
        assert!(engagement::toggle_favorite(&mut conn, post_id, user_id).unwrap());
    }

    pub fn count(&self, sql: &str, param: &str) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row(sql, [param], |row| row.get(0)).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send(method, uri, token, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
