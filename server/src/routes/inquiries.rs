use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::decode_all;
use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{Envelope, Inquiry, InquiryParams},
    AppState,
};

pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Inquiry>>, AppError> {
    current.require_admin()?;
    let rows = state.db.read().await.all("inquiries")?;
    Ok(Json(decode_all(rows)?))
}

/// Public contact form. `status` is left to its column default unless the
/// caller sends one.
pub async fn create(
    State(state): State<AppState>,
    Json(Envelope { data }): Json<Envelope<InquiryParams>>,
) -> Result<(StatusCode, Json<Inquiry>), AppError> {
    if data.email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(AppError::Validation("email is invalid".to_string()));
    }
    let row = state.db.write().await.insert("inquiries", db::to_row(&data)?)?;
    let inquiry: Inquiry = db::from_row(row)?;
    log::info!("inquiry {} received: {:?}", inquiry.id, inquiry.subject);
    Ok((StatusCode::CREATED, Json(inquiry)))
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(Envelope { data }): Json<Envelope<InquiryParams>>,
) -> Result<Json<Inquiry>, AppError> {
    current.require_admin()?;
    let row = state.db.write().await.update("inquiries", id, db::to_row(&data)?)?;
    Ok(Json(db::from_row(row)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    current.require_admin()?;
    state.db.write().await.delete("inquiries", id)?;
    Ok(StatusCode::NO_CONTENT)
}
