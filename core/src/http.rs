//! HTTP requests and responses described as plain data.
//!
//! # Design
//! Resource groups build an `HttpRequest`, the middleware chain edits it in
//! place, and a `Transport` turns it into an `HttpResponse`. Keeping the
//! request as data means every step before the network can be asserted on
//! directly in tests.

use serde_json::Value;

use crate::multipart::MultipartForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Payload of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Sent as `multipart/form-data`; the transport picks the boundary.
    Multipart(MultipartForm),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including any query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every header with this name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.remove_header(name);
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart(_)))
    }

    /// The JSON payload, if there is one.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
