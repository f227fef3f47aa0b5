use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::{decode_all, require_present};
use crate::{
    auth::CurrentUser,
    db::{self, Database},
    error::AppError,
    models::{Booking, BookingParams, Envelope, Room, RoomStatus},
    AppState,
};

/// Status a guest may move their own booking to.
const CANCELLED: &str = "cancelled";

#[derive(Debug, Deserialize)]
pub struct BookingFilter {
    status: Option<String>,
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("`{field}` must be a YYYY-MM-DD date")))
}

/// Checks the stay against the room and returns its total price.
fn quote(db: &Database, room_id: i64, check_in: &str, check_out: &str, guests: i64) -> Result<f64, AppError> {
    let nights = (parse_date(check_out, "check_out")? - parse_date(check_in, "check_in")?).num_days();
    if nights < 1 {
        return Err(AppError::Validation("check_out must be after check_in".to_string()));
    }
    let room = Room::from_row(db.find("rooms", room_id)?)?;
    if room.status == RoomStatus::Maintenance {
        return Err(AppError::Validation(format!("room {room_id} is under maintenance")));
    }
    if guests < 1 || guests > room.capacity {
        return Err(AppError::Validation(format!(
            "room {room_id} holds between 1 and {} guests",
            room.capacity
        )));
    }
    Ok(nights as f64 * room.price)
}

pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let db = state.db.read().await;
    let rows = if current.0.is_admin() {
        db.all("bookings")?
    } else {
        db.where_eq("bookings", "user_id", &json!(current.0.id))?
    };
    let bookings: Vec<Booking> = decode_all(rows)?;
    Ok(Json(
        bookings
            .into_iter()
            .filter(|b| filter.status.as_deref().is_none_or(|s| b.status == s))
            .collect(),
    ))
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking: Booking = db::from_row(state.db.read().await.find("bookings", id)?)?;
    current.require_owner_or_admin(booking.user_id)?;
    Ok(Json(booking))
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(Envelope { data }): Json<Envelope<BookingParams>>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let room_id = require_present(data.room_id, "room_id")?;
    let check_in = require_present(data.check_in, "check_in")?;
    let check_out = require_present(data.check_out, "check_out")?;
    let guests = data.guests.unwrap_or(1);

    let mut db = state.db.write().await;
    let total_price = quote(&db, room_id, &check_in, &check_out, guests)?;
    let row = db.insert(
        "bookings",
        db::to_row(&json!({
            "user_id": current.0.id,
            "room_id": room_id,
            "check_in": check_in,
            "check_out": check_out,
            "guests": guests,
            "total_price": total_price,
            "payment_method": data.payment_method,
            "payment_status": data.payment_status,
        }))?,
    )?;
    let booking: Booking = db::from_row(row)?;
    log::info!(
        "booking {} for room {room_id} by user {} ({} to {})",
        booking.id,
        current.0.id,
        booking.check_in,
        booking.check_out
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(Envelope { data }): Json<Envelope<BookingParams>>,
) -> Result<Json<Booking>, AppError> {
    let mut db = state.db.write().await;
    let booking: Booking = db::from_row(db.find("bookings", id)?)?;
    current.require_owner_or_admin(booking.user_id)?;
    if !current.0.is_admin() && data.status.as_deref().is_some_and(|s| s != CANCELLED) {
        return Err(AppError::Forbidden);
    }
    if data.room_id.is_some_and(|room| room != booking.room_id) {
        return Err(AppError::Validation("a booking can't be moved to another room".to_string()));
    }

    let mut changes = db::to_row(&data)?;
    changes.remove("room_id");
    if data.check_in.is_some() || data.check_out.is_some() || data.guests.is_some() {
        let check_in = data.check_in.as_deref().unwrap_or(&booking.check_in);
        let check_out = data.check_out.as_deref().unwrap_or(&booking.check_out);
        let guests = data.guests.unwrap_or(booking.guests);
        let total_price = quote(&db, booking.room_id, check_in, check_out, guests)?;
        changes.insert("total_price".to_string(), json!(total_price));
    }
    let row = db.update("bookings", id, changes)?;
    Ok(Json(db::from_row(row)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut db = state.db.write().await;
    let booking: Booking = db::from_row(db.find("bookings", id)?)?;
    current.require_owner_or_admin(booking.user_id)?;
    db.delete("bookings", id)?;
    Ok(StatusCode::NO_CONTENT)
}
