use super::wrap;
use crate::{
    client::ApiClient,
    error::ApiError,
    http::HttpMethod,
    types::{Inquiry, InquiryUpdate, NewInquiry},
};

/// Contact-form inquiries. Creating one needs no token; everything else
/// is admin-only on the server.
pub struct Inquiries<'a> {
    client: &'a ApiClient,
}

impl<'a> Inquiries<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn get_all(&self) -> Result<Vec<Inquiry>, ApiError> {
        self.client
            .send_json(self.client.request(HttpMethod::Get, "/inquiries"))
    }

    pub fn create(&self, data: &NewInquiry) -> Result<Inquiry, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/inquiries");
        req.body = Some(wrap("inquiry", data)?);
        self.client.send_json(req)
    }

    pub fn update(&self, id: i64, data: &InquiryUpdate) -> Result<Inquiry, ApiError> {
        let mut req = self
            .client
            .request(HttpMethod::Patch, &format!("/inquiries/{id}"));
        req.body = Some(wrap("inquiry", data)?);
        self.client.send_json(req)
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(HttpMethod::Delete, &format!("/inquiries/{id}")))
    }
}
