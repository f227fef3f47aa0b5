use super::{with_query, wrap};
use crate::{
    client::ApiClient,
    error::ApiError,
    http::HttpMethod,
    types::{Booking, BookingQuery, BookingUpdate, NewBooking},
};

pub struct Bookings<'a> {
    client: &'a ApiClient,
}

impl<'a> Bookings<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Admins see every booking, guests only their own.
    pub fn get_all(&self, params: &BookingQuery) -> Result<Vec<Booking>, ApiError> {
        let path = with_query("/bookings", params)?;
        self.client
            .send_json(self.client.request(HttpMethod::Get, &path))
    }

    pub fn get_by_id(&self, id: i64) -> Result<Booking, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, &format!("/bookings/{id}")))
    }

    pub fn create(&self, data: &NewBooking) -> Result<Booking, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/bookings");
        req.body = Some(wrap("booking", data)?);
        self.client.send_json(req)
    }

    pub fn update(&self, id: i64, data: &BookingUpdate) -> Result<Booking, ApiError> {
        let mut req = self
            .client
            .request(HttpMethod::Patch, &format!("/bookings/{id}"));
        req.body = Some(wrap("booking", data)?);
        self.client.send_json(req)
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(HttpMethod::Delete, &format!("/bookings/{id}")))
    }
}
