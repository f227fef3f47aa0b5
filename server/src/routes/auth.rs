use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::normalize_email;
use crate::{
    auth::{hash_password, verify_password},
    db::{self, Row},
    error::AppError,
    models::{Envelope, NewUser, User},
    AppState,
};

const MIN_PASSWORD_LEN: usize = 6;
const RESET_TOKEN_TTL_HOURS: i64 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    email: String,
    token: String,
    password: String,
}

/// Columns of `users` that never leave the server.
#[derive(Deserialize)]
struct Credentials {
    id: i64,
    name: String,
    password_digest: String,
    reset_password_token: Option<String>,
    reset_password_sent_at: Option<String>,
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(Envelope { data }): Json<Envelope<NewUser>>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&data.email);
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".to_string()));
    }
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("`name` can't be blank".to_string()));
    }
    validate_password(&data.password)?;
    let digest = hash_password(&data.password)?;

    let mut db = state.db.write().await;
    if !db.where_eq("users", "email", &json!(email))?.is_empty() {
        return Err(AppError::Validation("email has already been taken".to_string()));
    }
    let row = db.insert(
        "users",
        db::to_row(&json!({
            "name": data.name.trim(),
            "email": email,
            "password_digest": digest,
            "phone": data.phone,
        }))?,
    )?;
    let user: User = db::from_row(row)?;
    let token = state.tokens.issue(user.id)?;
    log::info!("registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Unauthorized("invalid email or password".to_string());

    let db = state.db.read().await;
    let row = db
        .where_eq("users", "email", &json!(normalize_email(&input.email)))?
        .into_iter()
        .next()
        .ok_or_else(invalid)?;
    let credentials: Credentials = db::from_row(row.clone())?;
    if !verify_password(&input.password, &credentials.password_digest) {
        return Err(invalid());
    }
    let user: User = db::from_row(row)?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(AuthResponse { token, user }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = normalize_email(&input.email);
    let mut db = state.db.write().await;
    let found = db.where_eq("users", "email", &json!(email))?.into_iter().next();

    if let Some(row) = found {
        let credentials: Credentials = db::from_row(row)?;
        let token = Uuid::new_v4().simple().to_string();
        db.update(
            "users",
            credentials.id,
            db::to_row(&json!({
                "reset_password_token": token,
                "reset_password_sent_at": db::now(),
            }))?,
        )?;
        drop(db);

        let delivered = state
            .reset_mail
            .compose(&credentials.name, &email, &token)
            .and_then(|message| state.mailer.deliver(message));
        if let Err(e) = delivered {
            log::error!("password reset mail for user {} failed: {e}", credentials.id);
        }
    } else {
        log::debug!("password reset requested for unknown email");
    }

    Ok(Json(MessageResponse {
        message: "If that email is registered, reset instructions are on their way".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let invalid = || AppError::Validation("reset token is invalid or has expired".to_string());
    validate_password(&input.password)?;
    let digest = hash_password(&input.password)?;

    let mut db = state.db.write().await;
    let row = db
        .where_eq("users", "email", &json!(normalize_email(&input.email)))?
        .into_iter()
        .next()
        .ok_or_else(invalid)?;
    let credentials: Credentials = db::from_row(row)?;

    if credentials.reset_password_token.as_deref() != Some(input.token.as_str()) {
        return Err(invalid());
    }
    let sent_at = credentials
        .reset_password_sent_at
        .as_deref()
        .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
        .ok_or_else(invalid)?;
    if Utc::now() - sent_at.with_timezone(&Utc) > Duration::hours(RESET_TOKEN_TTL_HOURS) {
        return Err(invalid());
    }

    let mut changes = Row::new();
    changes.insert("password_digest".to_string(), Value::from(digest));
    changes.insert("reset_password_token".to_string(), Value::Null);
    changes.insert("reset_password_sent_at".to_string(), Value::Null);
    db.update("users", credentials.id, changes)?;
    log::info!("password reset for user {}", credentials.id);

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}
