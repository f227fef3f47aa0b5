//! Password-reset notifications.
//!
//! # Design
//! Composing a message and delivering it are separate steps. The composer is
//! pure and fully determined by the user, the token and the configured
//! hosts; delivery goes through the `Mailer` trait so the server can log
//! messages in development and tests can inspect an outbox.

use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::config::ServerConfig;

pub const RESET_SUBJECT: &str = "Password Reset Instructions - Hotel Management System by Sagheer Ahmad";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("could not build reset link: {0}")]
    Link(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

pub trait Mailer: Send + Sync {
    fn deliver(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Writes every message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn deliver(&self, email: OutgoingEmail) -> Result<(), MailError> {
        log::info!(
            "mail from={} to={} subject={:?}\n{}",
            email.from,
            email.to,
            email.subject,
            email.body
        );
        Ok(())
    }
}

/// Keeps delivered messages in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbox(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

impl Mailer for MemoryMailer {
    fn deliver(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.outbox
            .lock()
            .map_err(|e| MailError::Delivery(e.to_string()))?
            .push(email);
        Ok(())
    }
}

#[derive(Serialize)]
struct ResetQuery<'a> {
    email: &'a str,
    token: &'a str,
}

#[derive(Debug, Clone)]
pub struct PasswordResetMailer {
    from: String,
    frontend_url: String,
}

impl PasswordResetMailer {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }

    pub fn reset_link(&self, email: &str, token: &str) -> Result<String, MailError> {
        let query = serde_urlencoded::to_string(ResetQuery { email, token })
            .map_err(|e| MailError::Link(e.to_string()))?;
        Ok(format!("{}/reset-password?{query}", self.frontend_url))
    }

    pub fn compose(&self, name: &str, email: &str, token: &str) -> Result<OutgoingEmail, MailError> {
        let link = self.reset_link(email, token)?;
        let body = format!(
            "Hello {name},\n\n\
             Someone requested a link to change your password. You can do this through the link below.\n\n\
             {link}\n\n\
             If you didn't request this, please ignore this email.\n\
             Your password won't change until you access the link above and create a new one.\n"
        );
        Ok(OutgoingEmail {
            from: self.from.clone(),
            to: email.to_string(),
            subject: RESET_SUBJECT.to_string(),
            body,
        })
    }
}
