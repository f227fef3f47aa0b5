use super::wrap;
use crate::{
    client::ApiClient,
    error::ApiError,
    http::{HttpMethod, RequestBody},
    multipart::MultipartForm,
    types::{User, UserUpdate},
};

/// Body of a user update: JSON fields, or a multipart form when a file
/// such as an avatar is attached.
#[derive(Debug, Clone)]
pub enum UserPayload {
    Fields(UserUpdate),
    Multipart(MultipartForm),
}

impl From<UserUpdate> for UserPayload {
    fn from(update: UserUpdate) -> Self {
        UserPayload::Fields(update)
    }
}

impl From<MultipartForm> for UserPayload {
    fn from(form: MultipartForm) -> Self {
        UserPayload::Multipart(form)
    }
}

pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn get_all(&self) -> Result<Vec<User>, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, "/users"))
    }

    pub fn get_by_id(&self, id: i64) -> Result<User, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, &format!("/users/{id}")))
    }

    /// Multipart forms are sent unwrapped; the content-type header is left
    /// to the transport.
    pub fn update(&self, id: i64, payload: impl Into<UserPayload>) -> Result<User, ApiError> {
        let mut req = self
            .client
            .request(HttpMethod::Patch, &format!("/users/{id}"));
        req.body = Some(match payload.into() {
            UserPayload::Fields(update) => wrap("user", &update)?,
            UserPayload::Multipart(form) => RequestBody::Multipart(form),
        });
        self.client.send_json(req)
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(HttpMethod::Delete, &format!("/users/{id}")))
    }
}
