use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::TokenSigner;
use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub tokens: Arc<TokenSigner>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config, tokens: TokenSigner) -> Self {
        Self {
            db,
            config,
            tokens: Arc::new(tokens),
        }
    }
}
