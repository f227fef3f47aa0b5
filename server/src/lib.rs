//! REST backend for the hotel management system.
//!
//! # Overview
//! Serves rooms, bookings, reviews, users and inquiries under `/api/v1`.
//! Storage is an in-memory `Database` whose tables come from the versioned
//! migrations in `migrations`; every write is checked against that schema.
//!
//! # Design
//! - `AppState` is cheap to clone: the database sits behind one
//!   `Arc<RwLock<_>>` and each handler holds the lock for its whole
//!   read-modify-write.
//! - Request bodies are envelopes keyed by the resource's singular name;
//!   responses are the bare resource.
//! - DTOs are defined independently from the client crate; the client's
//!   integration tests catch schema drift.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod mailer;
pub mod migrations;
pub mod models;
pub mod routes;
pub mod schema;
pub mod uploads;

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    db::{Database, DbError},
    error::AppError,
    mailer::{LogMailer, Mailer, PasswordResetMailer},
    uploads::AvatarStore,
};

pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Database>>,
    pub tokens: Arc<TokenIssuer>,
    pub reset_mail: PasswordResetMailer,
    pub mailer: Arc<dyn Mailer>,
    pub avatars: AvatarStore,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, DbError> {
        Self::with_mailer(config, Arc::new(LogMailer))
    }

    pub fn with_mailer(config: &ServerConfig, mailer: Arc<dyn Mailer>) -> Result<Self, DbError> {
        Ok(Self {
            db: Arc::new(RwLock::new(Database::migrated()?)),
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret)),
            reset_mail: PasswordResetMailer::new(config),
            mailer,
            avatars: AvatarStore::new(),
        })
    }

    /// Creates an admin account, or promotes the existing user with that
    /// email.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<i64, AppError> {
        let mut db = self.db.write().await;
        let existing = db.where_eq("users", "email", &json!(email))?;
        if let Some(row) = existing.first() {
            let id = row.get("id").and_then(Value::as_i64).unwrap_or_default();
            db.update("users", id, db::to_row(&json!({ "role": "admin" }))?)?;
            return Ok(id);
        }
        let digest = auth::hash_password(password)?;
        let row = db.insert(
            "users",
            db::to_row(&json!({
                "name": "Administrator",
                "email": email,
                "password_digest": digest,
                "role": "admin",
            }))?,
        )?;
        Ok(row.get("id").and_then(Value::as_i64).unwrap_or_default())
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, routes::api())
        .merge(routes::uploads())
        .with_state(state)
}

/// Adds CORS for the web frontend's origin.
pub fn with_cors(router: Router, frontend_url: &str) -> Router {
    let cors = match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            log::warn!("invalid frontend origin {frontend_url:?}, allowing any origin");
            CorsLayer::new().allow_origin(Any)
        }
    };
    router.layer(cors.allow_methods(Any).allow_headers(Any))
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
