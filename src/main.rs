use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use styleshare::auth::password::hash_password;
use styleshare::auth::token::{generate_secret, TokenSigner};
use styleshare::config::{Cli, Config, JWT_SECRET_ENV};
use styleshare::db;
use styleshare::db::users::{self, NewUser};
use styleshare::state::{AppState, DbPool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    seed_admin(&pool, &config)?;

    let secret = match config.auth.jwt_secret.clone() {
        Some(secret) => secret,
        None => {
            tracing::warn!(
                "No JWT secret configured (set auth.jwt_secret or {}); \
                 tokens will not survive a restart",
                JWT_SECRET_ENV
            );
            generate_secret()
        }
    };
    let tokens = TokenSigner::new(secret.as_bytes(), config.auth.token_hours)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = styleshare::app(AppState::new(pool, config, tokens));

    // Start server
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn seed_admin(pool: &DbPool, config: &Config) -> anyhow::Result<()> {
    let Some((email, username, password)) = config.admin.credentials() else {
        return Ok(());
    };
    let password_hash = hash_password(password, config.auth.bcrypt_cost)?;
    let conn = pool.get()?;
    let created = users::ensure_admin(
        &conn,
        &NewUser {
            email,
            username,
            password_hash: &password_hash,
            is_admin: true,
        },
    )?;
    if created {
        tracing::info!("Created admin account {}", email);
    }
    Ok(())
}
