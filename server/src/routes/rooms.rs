use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Envelope, Room, RoomCategory, RoomParams, RoomStatus},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct RoomFilter {
    category: Option<RoomCategory>,
    status: Option<RoomStatus>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    /// Minimum number of guests the room must hold.
    capacity: Option<i64>,
    is_featured: Option<bool>,
}

impl RoomFilter {
    fn matches(&self, room: &Room) -> bool {
        self.category.is_none_or(|c| room.category == c)
            && self.status.is_none_or(|s| room.status == s)
            && self.min_price.is_none_or(|min| room.price >= min)
            && self.max_price.is_none_or(|max| room.price <= max)
            && self.capacity.is_none_or(|cap| room.capacity >= cap)
            && self.is_featured.is_none_or(|f| room.is_featured == f)
    }
}

async fn load_rooms(state: &AppState) -> Result<Vec<Room>, AppError> {
    let rows = state.db.read().await.all("rooms")?;
    rows.into_iter()
        .map(|row| Room::from_row(row).map_err(AppError::from))
        .collect()
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = load_rooms(&state).await?;
    Ok(Json(rooms.into_iter().filter(|r| filter.matches(r)).collect()))
}

pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = load_rooms(&state).await?;
    Ok(Json(rooms.into_iter().filter(|r| r.is_featured).collect()))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Room>, AppError> {
    let row = state.db.read().await.find("rooms", id)?;
    Ok(Json(Room::from_row(row)?))
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(Envelope { data }): Json<Envelope<RoomParams>>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    current.require_admin()?;
    validate(&data)?;
    let row = state.db.write().await.insert("rooms", data.into_row()?)?;
    let room = Room::from_row(row)?;
    log::info!("room {} created by user {}", room.id, current.0.id);
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(Envelope { data }): Json<Envelope<RoomParams>>,
) -> Result<Json<Room>, AppError> {
    current.require_admin()?;
    validate(&data)?;
    let row = state.db.write().await.update("rooms", id, data.into_row()?)?;
    Ok(Json(Room::from_row(row)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    current.require_admin()?;
    state.db.write().await.delete("rooms", id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate(params: &RoomParams) -> Result<(), AppError> {
    if params.price.is_some_and(|p| p < 0.0) {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }
    if params.capacity.is_some_and(|c| c < 1) {
        return Err(AppError::Validation("capacity must be at least 1".to_string()));
    }
    if params.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("`name` can't be blank".to_string()));
    }
    Ok(())
}
