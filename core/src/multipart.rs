//! `multipart/form-data` payloads for binary-bearing updates such as avatars.

use std::io::Cursor;

use common_multipart_rfc7578::client::multipart::{Body, Form};
use futures::executor::block_on_stream;
use mime::Mime;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// Ordered form fields. Field names are sent as given, at the top level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, Part)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push((name.to_string(), Part::Text(value.into())));
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: impl Into<Vec<u8>>) -> Self {
        self.parts.push((
            name.to_string(),
            Part::File {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                data: data.into(),
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, Part)] {
        &self.parts
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            Part::Text(value) if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Encodes the form as RFC 7578 `multipart/form-data` under a fresh
    /// random boundary. Returns the matching content type and the body.
    pub fn encode(&self) -> Result<(String, Vec<u8>), ApiError> {
        let mut form = Form::default();
        for (name, part) in &self.parts {
            match part {
                Part::Text(value) => form.add_text(name, value.clone()),
                Part::File {
                    file_name,
                    content_type,
                    data,
                } => {
                    let mime = content_type
                        .parse::<Mime>()
                        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
                    form.add_reader_file_with_mime(
                        name,
                        Cursor::new(data.clone()),
                        file_name.clone(),
                        mime,
                    );
                }
            }
        }

        let content_type = form.content_type();
        let mut body = Vec::new();
        for chunk in block_on_stream(Box::pin(Body::from(form))) {
            let chunk = chunk.map_err(|e| ApiError::Serialization(e.to_string()))?;
            body.extend_from_slice(&chunk);
        }
        Ok((content_type, body))
    }
}
