use serde::Serialize;

use super::{json, wrap};
use crate::{
    client::ApiClient,
    error::ApiError,
    http::HttpMethod,
    types::{AuthResponse, MessageResponse, NewUser},
};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ForgotPassword<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPassword<'a> {
    email: &'a str,
    token: &'a str,
    password: &'a str,
}

/// Login, registration and password reset.
///
/// These calls only return the token; storing it in the client's
/// `TokenStore` is up to the caller.
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/auth/login");
        req.body = Some(json(&Credentials { email, password })?);
        self.client.send_json(req)
    }

    pub fn register(&self, user: &NewUser) -> Result<AuthResponse, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/auth/register");
        req.body = Some(wrap("user", user)?);
        self.client.send_json(req)
    }

    pub fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/auth/forgot_password");
        req.body = Some(json(&ForgotPassword { email })?);
        self.client.send_json(req)
    }

    pub fn reset_password(
        &self,
        email: &str,
        token: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let mut req = self.client.request(HttpMethod::Post, "/auth/reset_password");
        req.body = Some(json(&ResetPassword {
            email,
            token,
            password,
        })?);
        self.client.send_json(req)
    }
}
