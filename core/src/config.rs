//! Client configuration, resolved once at startup.

use std::env;

/// Environment variable that overrides the API host.
pub const BASE_URL_ENV: &str = "HOTEL_API_URL";

/// Host used when `HOTEL_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Versioned prefix every resource path is composed under.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the base URL through `lookup`, falling back to
    /// `DEFAULT_BASE_URL` when it is missing or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::new(url.trim()),
            None => Self::default(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.default_headers
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// `<base_url>/api/v1<path>`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }
}
