//! Executes `HttpRequest`s over the network.

use ureq::{typestate::WithBody, Agent, RequestBuilder};

use crate::{
    error::ApiError,
    http::{HttpMethod, HttpRequest, HttpResponse, RequestBody},
};

pub trait Transport: Send + Sync {
    /// Returns any response the server sent, 4xx/5xx included; only
    /// failures to get a response at all are errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport on a shared ureq agent.
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are interpreted by the client, not by ureq.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let (payload, content_type) = encode(request.body.as_ref())?;
        let url = request.url.as_str();
        let headers = &request.headers;

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(url), headers), payload, content_type),
            HttpMethod::Put => send(with_headers(self.agent.put(url), headers), payload, content_type),
            HttpMethod::Patch => send(with_headers(self.agent.patch(url), headers), payload, content_type),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Serializes the body. Multipart bodies also return their content type,
/// which carries the boundary.
fn encode(body: Option<&RequestBody>) -> Result<(Option<Vec<u8>>, Option<String>), ApiError> {
    match body {
        None => Ok((None, None)),
        Some(RequestBody::Json(value)) => {
            let bytes = serde_json::to_vec(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
            Ok((Some(bytes), None))
        }
        Some(RequestBody::Multipart(form)) => {
            let (content_type, bytes) = form.encode()?;
            Ok((Some(bytes), Some(content_type)))
        }
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    mut builder: RequestBuilder<WithBody>,
    payload: Option<Vec<u8>>,
    content_type: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type.as_str());
    }
    match payload {
        Some(bytes) => builder.send(&bytes[..]),
        None => builder.send_empty(),
    }
}
