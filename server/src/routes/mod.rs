//! HTTP handlers, one module per resource.

mod auth;
mod bookings;
mod inquiries;
mod reviews;
mod rooms;
mod users;

use axum::{
    routing::{get, patch, post},
    Router,
};
use serde::de::DeserializeOwned;

use crate::{
    db::{self, Row},
    error::AppError,
    AppState,
};

pub use auth::{AuthResponse, MessageResponse};

/// Routes relative to the API prefix.
pub fn api() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot_password", post(auth::forgot_password))
        .route("/auth/reset_password", post(auth::reset_password))
        .route("/rooms", get(rooms::list).post(rooms::create))
        .route("/rooms/featured", get(rooms::featured))
        .route(
            "/rooms/{id}",
            get(rooms::show).put(rooms::update).delete(rooms::destroy),
        )
        .route(
            "/rooms/{id}/reviews",
            get(reviews::for_room).post(reviews::create),
        )
        .route("/reviews", get(reviews::list))
        .route(
            "/reviews/{id}",
            patch(reviews::update).delete(reviews::destroy),
        )
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route(
            "/bookings/{id}",
            get(bookings::show)
                .patch(bookings::update)
                .delete(bookings::destroy),
        )
        .route("/users", get(users::list))
        .route(
            "/users/{id}",
            get(users::show).patch(users::update).delete(users::destroy),
        )
        .route("/inquiries", get(inquiries::list).post(inquiries::create))
        .route(
            "/inquiries/{id}",
            patch(inquiries::update).delete(inquiries::destroy),
        )
}

/// Routes serving uploaded files, outside the API prefix.
pub fn uploads() -> Router<AppState> {
    Router::new().route("/uploads/avatars/{id}/{file_name}", get(users::avatar))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| db::from_row(row).map_err(AppError::from))
        .collect()
}

fn require_present<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("`{field}` can't be blank")))
}
