use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: String,
    pub is_admin: bool,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token lifetime of {0} hours is out of range")]
    LifetimeOutOfRange(u64),

    #[error("token expiry overflows the calendar")]
    ExpiryOverflow,

    #[error("token signing failed: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Converts a configured lifetime, rejecting values whose expiry could not
/// be represented as a timestamp.
pub fn token_ttl(hours: u64) -> Result<TimeDelta, TokenError> {
    let ttl = i64::try_from(hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .ok_or(TokenError::LifetimeOutOfRange(hours))?;
    Utc::now()
        .checked_add_signed(ttl)
        .ok_or(TokenError::LifetimeOutOfRange(hours))?;
    Ok(ttl)
}

/// Issues and verifies HS256 tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl_hours: u64) -> Result<Self, TokenError> {
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl: token_ttl(ttl_hours)?,
        })
    }

    pub fn issue(&self, user_id: &str, is_admin: bool) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOverflow)?;
        let claims = Claims {
            id: user_id.to_string(),
            is_admin,
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

/// Generate a random 64-character hex secret for when none is configured.
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
