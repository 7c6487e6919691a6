// src/mail/mailer.rs
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailError, NotificationTransport};
use crate::config::Config;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError(e.to_string()))?
            .timeout(Some(SMTP_TIMEOUT));

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| MailError(format!("Invalid SMTP_FROM address: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl NotificationTransport for SmtpMailer {
    async fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if to_email.is_empty() || !to_email.contains('@') {
            return Err(MailError(format!("Invalid email address: {}", to_email)));
        }

        let to = to_email
            .parse::<Mailbox>()
            .map_err(|e| MailError(format!("Invalid email address {}: {}", to_email, e)))?;

        let html_body = format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #2c3e50;">{}</h2>
    <div style="background: #f8f9fa; padding: 15px; border-left: 4px solid #2c3e50; margin: 20px 0;">
      {}
    </div>
    <p>Best regards,<br>Support team</p>
  </div>
</body>
</html>"#,
            subject, body
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                body.to_string(),
                html_body,
            ))
            .map_err(|e| MailError(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError(e.to_string()))?;

        tracing::info!("✓ Email sent successfully to {}", to_email);
        Ok(())
    }
}
