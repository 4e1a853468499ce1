use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::token::token_ttl;

/// Environment variable that overrides `auth.jwt_secret` from the config file.
pub const JWT_SECRET_ENV: &str = "STYLESHARE_JWT_SECRET";

#[derive(Parser, Debug)]
#[command(name = "styleshare", about = "Code snippet sharing service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub admin: AdminSeedConfig,
    pub cors: CorsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens. Generated at startup when unset.
    pub jwt_secret: Option<String>,
    pub token_hours: u64,
    pub bcrypt_cost: u32,
}

/// Admin account created at startup when all three fields are present.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AdminSeedConfig {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_hours: 168,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AdminSeedConfig {
    /// Returns `(email, username, password)` when the seed is fully configured.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.email, &self.username, &self.password) {
            (Some(email), Some(username), Some(password)) => {
                Some((email.as_str(), username.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
            if !secret.is_empty() {
                config.auth.jwt_secret = Some(secret);
            }
        }

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("styleshare.db"));
        }

        token_ttl(config.auth.token_hours)
            .map_err(|e| anyhow::anyhow!("Invalid auth.token_hours: {}", e))?;

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
        match cli.data_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".styleshare"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory")),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("styleshare.db"))
    }
}
