//! Typed views over stored rows, plus the request envelopes handlers accept.

use serde::{Deserialize, Serialize};

use crate::db::{self, DbError, Row};

/// Integer-coded on storage, snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    Standard,
    Deluxe,
    Suite,
    Family,
}

impl RoomCategory {
    pub fn code(self) -> i64 {
        match self {
            RoomCategory::Standard => 0,
            RoomCategory::Deluxe => 1,
            RoomCategory::Suite => 2,
            RoomCategory::Family => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RoomCategory::Standard),
            1 => Some(RoomCategory::Deluxe),
            2 => Some(RoomCategory::Suite),
            3 => Some(RoomCategory::Family),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn code(self) -> i64 {
        match self {
            RoomStatus::Available => 0,
            RoomStatus::Occupied => 1,
            RoomStatus::Maintenance => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RoomStatus::Available),
            1 => Some(RoomStatus::Occupied),
            2 => Some(RoomStatus::Maintenance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub capacity: i64,
    pub category: RoomCategory,
    pub status: RoomStatus,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Row layout of `rooms`, before the enum codes are decoded.
#[derive(Deserialize)]
struct RoomRecord {
    id: i64,
    name: String,
    description: String,
    price: f64,
    capacity: i64,
    category: i64,
    status: i64,
    is_featured: bool,
    created_at: String,
    updated_at: String,
}

impl Room {
    pub fn from_row(row: Row) -> Result<Self, DbError> {
        let r: RoomRecord = db::from_row(row)?;
        let category = RoomCategory::from_code(r.category)
            .ok_or_else(|| DbError::Decode(format!("unknown room category {}", r.category)))?;
        let status = RoomStatus::from_code(r.status)
            .ok_or_else(|| DbError::Decode(format!("unknown room status {}", r.status)))?;
        Ok(Room {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            capacity: r.capacity,
            category,
            status,
            is_featured: r.is_featured,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Room fields as sent by clients. Used for both create and update; on
/// create the store rejects whatever required column is still missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<i64>,
    pub category: Option<RoomCategory>,
    pub status: Option<RoomStatus>,
    pub is_featured: Option<bool>,
}

#[derive(Serialize)]
struct RoomParamsRow {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    capacity: Option<i64>,
    category: Option<i64>,
    status: Option<i64>,
    is_featured: Option<bool>,
}

impl RoomParams {
    pub fn into_row(self) -> Result<Row, DbError> {
        db::to_row(&RoomParamsRow {
            name: self.name,
            description: self.description,
            price: self.price,
            capacity: self.capacity,
            category: self.category.map(RoomCategory::code),
            status: self.status.map(RoomStatus::code),
            is_featured: self.is_featured,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub check_in: String,
    pub check_out: String,
    pub guests: i64,
    pub total_price: f64,
    pub status: String,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingParams {
    pub room_id: Option<i64>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<i64>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewParams {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Public projection of `users`; the digest and reset columns stay behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub const ADMIN: &'static str = "admin";

    pub fn is_admin(&self) -> bool {
        self.role == Self::ADMIN
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
}

/// `{"room": {...}}`, `{"booking": {...}}` and friends.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(alias = "room", alias = "booking", alias = "review", alias = "user", alias = "inquiry")]
    pub data: T,
}
