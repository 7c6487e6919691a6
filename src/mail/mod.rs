// src/mail/mod.rs
pub mod mailer;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Failed to send email: {0}")]
pub struct MailError(pub String);

#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
