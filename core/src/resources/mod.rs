//! Resource operation groups, borrowed from an `ApiClient`.
//!
//! Every JSON payload is wrapped under the resource's singular key
//! (`{"room": {...}}`); multipart payloads go out as-is.

pub mod auth;
pub mod bookings;
pub mod inquiries;
pub mod reviews;
pub mod rooms;
pub mod users;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{error::ApiError, http::RequestBody};

/// `{ key: data }` as a JSON body.
pub(crate) fn wrap<T: Serialize>(key: &str, data: &T) -> Result<RequestBody, ApiError> {
    let value = serde_json::to_value(data).map_err(|e| ApiError::Serialization(e.to_string()))?;
    let mut envelope = Map::new();
    envelope.insert(key.to_string(), value);
    Ok(RequestBody::Json(Value::Object(envelope)))
}

/// An unwrapped JSON body, for the auth endpoints.
pub(crate) fn json<T: Serialize>(data: &T) -> Result<RequestBody, ApiError> {
    serde_json::to_value(data)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Appends `query` to `path`, or returns `path` unchanged when every field
/// is empty.
pub(crate) fn with_query<Q: Serialize>(path: &str, query: &Q) -> Result<String, ApiError> {
    let encoded =
        serde_urlencoded::to_string(query).map_err(|e| ApiError::Serialization(e.to_string()))?;
    if encoded.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{path}?{encoded}"))
    }
}
