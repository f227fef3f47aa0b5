//! Error types for the hotel API client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body
//! so callers can inspect the server's `{"error": ...}` payload. Transport
//! failures (refused connections, timeouts) carry only a message.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The persisted token could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The `error` field of a structured error body.
    pub fn server_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(self.body()?)
            .ok()
            .map(|b| b.error)
    }
}
