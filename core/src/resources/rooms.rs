use super::{with_query, wrap};
use crate::{
    client::ApiClient,
    error::ApiError,
    http::HttpMethod,
    types::{NewRoom, Room, RoomQuery, RoomUpdate},
};

pub struct Rooms<'a> {
    client: &'a ApiClient,
}

impl<'a> Rooms<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn get_all(&self, params: &RoomQuery) -> Result<Vec<Room>, ApiError> {
        let path = with_query("/rooms", params)?;
        self.client
            .send_json(self.client.request(HttpMethod::Get, &path))
    }

    pub fn get_by_id(&self, id: i64) -> Result<Room, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, &format!("/rooms/{id}")))
    }

    pub fn create(&self, data: &NewRoom) -> Result<Room, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/rooms");
        req.body = Some(wrap("room", data)?);
        self.client.send_json(req)
    }

    /// Rooms are replaced with PUT; the other resources patch.
    pub fn update(&self, id: i64, data: &RoomUpdate) -> Result<Room, ApiError> {
        let mut req = self.client.request(HttpMethod::Put, &format!("/rooms/{id}"));
        req.body = Some(wrap("room", data)?);
        self.client.send_json(req)
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(HttpMethod::Delete, &format!("/rooms/{id}")))
    }

    pub fn get_featured(&self) -> Result<Vec<Room>, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, "/rooms/featured"))
    }
}
