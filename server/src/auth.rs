//! Bearer-token authentication for handlers.
//!
//! Tokens are HS256 JWTs carrying the user id. `CurrentUser` pulls the token
//! out of the `Authorization` header and loads the matching user row.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{self, DbError},
    error::AppError,
    models::User,
    AppState,
};

const TOKEN_TTL: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            exp: chrono::Utc::now().timestamp() + TOKEN_TTL,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("token expired".to_string()),
                _ => AppError::Unauthorized("invalid token".to_string()),
            })
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_password(password: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Passes for the owner of a record and for admins.
    pub fn require_owner_or_admin(&self, owner_id: i64) -> Result<(), AppError> {
        if self.0.id == owner_id || self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid authorization header".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

        let claims = state.tokens.verify(token)?;
        let row = match state.db.read().await.find("users", claims.sub) {
            Ok(row) => row,
            Err(DbError::RecordNotFound { .. }) => {
                return Err(AppError::Unauthorized("user no longer exists".to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(CurrentUser(db::from_row(row)?))
    }
}
