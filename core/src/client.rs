//! The configured API client and its request pipeline.
//!
//! # Design
//! `ApiClient` is built once and never mutated afterwards. Every call goes
//! through the same pipeline: a resource group builds an `HttpRequest`
//! from the config, the middleware chain edits it, the `Transport` executes
//! it, and the observers see the outcome. Only the token store holds state
//! that changes between calls.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
    config::ClientConfig,
    error::ApiError,
    http::{HttpMethod, HttpRequest, HttpResponse},
    middleware::{BearerAuth, LogObserver, MultipartContentType, RequestMiddleware, ResponseObserver},
    resources::{
        auth::Auth, bookings::Bookings, inquiries::Inquiries, reviews::Reviews, rooms::Rooms,
        users::Users,
    },
    token::{MemoryTokenStore, TokenStore},
    transport::{Transport, UreqTransport},
};

pub struct ApiClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    token_store: Arc<dyn TokenStore>,
    middleware: Vec<Box<dyn RequestMiddleware>>,
    observers: Vec<Box<dyn ResponseObserver>>,
}

impl ApiClient {
    /// A client over ureq with an in-memory token store.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    /// A bare request for `path` under the API prefix, carrying the
    /// default headers.
    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: self.config.url(path),
            headers: self.config.default_headers().to_vec(),
            body: None,
        }
    }

    /// Runs `request` through the middleware chain and the transport.
    /// Non-2xx responses come back as `ApiError::Http`.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        for middleware in &self.middleware {
            middleware.apply(&mut request);
        }

        let outcome = self
            .transport
            .execute(&request)
            .and_then(|response| {
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(ApiError::Http {
                        status: response.status,
                        body: response.body,
                    })
                }
            });

        match &outcome {
            Ok(response) => self
                .observers
                .iter()
                .for_each(|o| o.on_success(&request, response)),
            Err(error) => self
                .observers
                .iter()
                .for_each(|o| o.on_failure(&request, error)),
        }
        outcome
    }

    pub fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.send(request)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Sends `request` and discards any response body.
    pub fn send_empty(&self, request: HttpRequest) -> Result<(), ApiError> {
        self.send(request).map(|_| ())
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn rooms(&self) -> Rooms<'_> {
        Rooms::new(self)
    }

    pub fn bookings(&self) -> Bookings<'_> {
        Bookings::new(self)
    }

    pub fn reviews(&self) -> Reviews<'_> {
        Reviews::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn inquiries(&self) -> Inquiries<'_> {
        Inquiries::new(self)
    }
}

/// Assembles an `ApiClient`. Bearer auth and the multipart fix-up always
/// run first; extra middleware runs after them in the order added.
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Box<dyn Transport>>,
    token_store: Option<Arc<dyn TokenStore>>,
    middleware: Vec<Box<dyn RequestMiddleware>>,
    observers: Vec<Box<dyn ResponseObserver>>,
}

impl ApiClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            token_store: None,
            middleware: Vec::new(),
            observers: vec![Box::new(LogObserver)],
        }
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn observer(mut self, observer: impl ResponseObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn build(self) -> ApiClient {
        let token_store = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        let mut middleware: Vec<Box<dyn RequestMiddleware>> = vec![
            Box::new(BearerAuth::new(Arc::clone(&token_store))),
            Box::new(MultipartContentType),
        ];
        middleware.extend(self.middleware);

        ApiClient {
            config: self.config,
            transport: self
                .transport
                .unwrap_or_else(|| Box::new(UreqTransport::new())),
            token_store,
            middleware,
            observers: self.observers,
        }
    }
}
