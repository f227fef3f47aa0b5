use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{decode_all, require_present};
use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{Envelope, Review, ReviewParams},
    AppState,
};

const RATINGS: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Debug, Deserialize)]
pub struct ReviewFilter {
    user_id: Option<i64>,
}

fn validate(params: &ReviewParams) -> Result<(), AppError> {
    if params.rating.is_some_and(|r| !RATINGS.contains(&r)) {
        return Err(AppError::Validation("rating must be between 1 and 5".to_string()));
    }
    if params.comment.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("`comment` can't be blank".to_string()));
    }
    Ok(())
}

pub async fn for_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<Review>>, AppError> {
    let db = state.db.read().await;
    db.find("rooms", room_id)?;
    let rows = db.where_eq("reviews", "room_id", &json!(room_id))?;
    Ok(Json(decode_all(rows)?))
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ReviewFilter>,
) -> Result<Json<Vec<Review>>, AppError> {
    let db = state.db.read().await;
    let rows = match filter.user_id {
        Some(user_id) => db.where_eq("reviews", "user_id", &json!(user_id))?,
        None => db.all("reviews")?,
    };
    Ok(Json(decode_all(rows)?))
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(room_id): Path<i64>,
    Json(Envelope { data }): Json<Envelope<ReviewParams>>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    validate(&data)?;
    let rating = require_present(data.rating, "rating")?;
    let comment = require_present(data.comment, "comment")?;

    let mut db = state.db.write().await;
    db.find("rooms", room_id)?;
    let row = db.insert(
        "reviews",
        db::to_row(&json!({
            "user_id": current.0.id,
            "room_id": room_id,
            "rating": rating,
            "comment": comment,
        }))?,
    )?;
    Ok((StatusCode::CREATED, Json(db::from_row(row)?)))
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(Envelope { data }): Json<Envelope<ReviewParams>>,
) -> Result<Json<Review>, AppError> {
    validate(&data)?;
    let mut db = state.db.write().await;
    let review: Review = db::from_row(db.find("reviews", id)?)?;
    current.require_owner_or_admin(review.user_id)?;
    let row = db.update("reviews", id, db::to_row(&data)?)?;
    Ok(Json(db::from_row(row)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut db = state.db.write().await;
    let review: Review = db::from_row(db.find("reviews", id)?)?;
    current.require_owner_or_admin(review.user_id)?;
    db.delete("reviews", id)?;
    Ok(StatusCode::NO_CONTENT)
}
