//! Blocking client for the hotel management API.
//!
//! # Overview
//! `ApiClient` talks to the REST backend under `/api/v1`. Resource groups
//! (`client.rooms()`, `client.bookings()`, ...) build requests, a
//! middleware chain attaches the bearer token and fixes up multipart
//! headers, and a `Transport` performs the round-trip.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`/`HttpResponse`),
//!   so everything before the network is testable without a server.
//! - The transport is a trait. `UreqTransport` is the default; tests plug
//!   in recording fakes.
//! - DTOs are defined independently from the server crate; the end-to-end
//!   tests catch schema drift.
//! - Every non-2xx response becomes `ApiError::Http` with the status and
//!   body intact.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod multipart;
pub mod resources;
pub mod token;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::{ClientConfig, API_PREFIX, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use middleware::{BearerAuth, LogObserver, MultipartContentType, RequestMiddleware, ResponseObserver};
pub use multipart::MultipartForm;
pub use resources::users::UserPayload;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_STORAGE_KEY};
pub use transport::{Transport, UreqTransport};
pub use types::*;
