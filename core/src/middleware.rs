//! Cross-cutting request and response handling.
//!
//! # Design
//! Request middleware are functions over `&mut HttpRequest`, run in
//! registration order before every call. Response observers see each
//! outcome after the transport returns; they cannot change it, so a
//! failure still reaches the caller exactly as the server sent it.

use std::sync::Arc;

use crate::{
    error::ApiError,
    http::{HttpRequest, HttpResponse},
    token::TokenStore,
};

pub trait RequestMiddleware: Send + Sync {
    fn apply(&self, request: &mut HttpRequest);
}

impl<F> RequestMiddleware for F
where
    F: Fn(&mut HttpRequest) + Send + Sync,
{
    fn apply(&self, request: &mut HttpRequest) {
        self(request)
    }
}

/// Sets `authorization: Bearer <token>` from the token store, or removes
/// the header when no token is stored.
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

impl RequestMiddleware for BearerAuth {
    fn apply(&self, request: &mut HttpRequest) {
        match self.store.token() {
            Some(token) => request.set_header("authorization", format!("Bearer {token}")),
            None => request.remove_header("authorization"),
        }
    }
}

/// Drops the default JSON content type from multipart requests; the
/// transport supplies `multipart/form-data` with its own boundary.
pub struct MultipartContentType;

impl RequestMiddleware for MultipartContentType {
    fn apply(&self, request: &mut HttpRequest) {
        if request.is_multipart() {
            request.remove_header("content-type");
        }
    }
}

pub trait ResponseObserver: Send + Sync {
    fn on_success(&self, request: &HttpRequest, response: &HttpResponse);
    fn on_failure(&self, request: &HttpRequest, error: &ApiError);
}

/// Records every outcome through the `log` facade.
pub struct LogObserver;

impl ResponseObserver for LogObserver {
    fn on_success(&self, request: &HttpRequest, response: &HttpResponse) {
        log::debug!(
            "{} {} -> {}: {}",
            request.method.as_str(),
            request.url,
            response.status,
            response.body
        );
    }

    fn on_failure(&self, request: &HttpRequest, error: &ApiError) {
        log::error!(
            "{} {} failed: status={:?} body={:?} error={}",
            request.method.as_str(),
            request.url,
            error.status(),
            error.body(),
            error
        );
    }
}
