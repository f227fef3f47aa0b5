use serde::Serialize;

use super::{with_query, wrap};
use crate::{
    client::ApiClient,
    error::ApiError,
    http::HttpMethod,
    types::{NewReview, Review, ReviewUpdate},
};

#[derive(Serialize)]
struct ByUser {
    user_id: i64,
}

pub struct Reviews<'a> {
    client: &'a ApiClient,
}

impl<'a> Reviews<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn get_by_room(&self, room_id: i64) -> Result<Vec<Review>, ApiError> {
        self.client.send_json(
            self.client
                .request(HttpMethod::Get, &format!("/rooms/{room_id}/reviews")),
        )
    }

    pub fn create(&self, room_id: i64, data: &NewReview) -> Result<Review, ApiError> {
        let mut req = self
            .client
            .request(HttpMethod::Post, &format!("/rooms/{room_id}/reviews"));
        req.body = Some(wrap("review", data)?);
        self.client.send_json(req)
    }

    pub fn update(&self, id: i64, data: &ReviewUpdate) -> Result<Review, ApiError> {
        let mut req = self
            .client
            .request(HttpMethod::Patch, &format!("/reviews/{id}"));
        req.body = Some(wrap("review", data)?);
        self.client.send_json(req)
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(HttpMethod::Delete, &format!("/reviews/{id}")))
    }

    pub fn get_all(&self) -> Result<Vec<Review>, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, "/reviews"))
    }

    pub fn get_by_user(&self, user_id: i64) -> Result<Vec<Review>, ApiError> {
        let path = with_query("/reviews", &ByUser { user_id })?;
        self.client
            .send_json(self.client.request(HttpMethod::Get, &path))
    }
}
