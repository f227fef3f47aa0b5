//! Server configuration loaded once at startup.

use std::env;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_MAIL_FROM: &str = "noreply@hotelmanagement.com";
pub const DEFAULT_JWT_SECRET: &str = "development-secret";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    /// Origin of the web frontend; used for CORS and for links in emails.
    pub frontend_url: String,
    pub mail_from: String,
    pub admin: Option<AdminSeed>,
}

/// Credentials for an admin account created at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            admin: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to the defaults
    /// for missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = match lookup("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                log::warn!("ignoring invalid PORT, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };
        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };
        Self {
            port,
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            frontend_url: lookup("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            mail_from: lookup("MAIL_FROM").unwrap_or(defaults.mail_from),
            admin,
        }
    }
}
