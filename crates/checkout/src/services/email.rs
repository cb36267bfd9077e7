//! SMTP delivery for staff notifications.
//!
//! Uses lettre's async transport. Port 465 connects with implicit TLS;
//! every other port upgrades with STARTTLS.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

use super::notification::NotificationPayload;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Delivers a composed notification.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send one message to every recipient in the payload.
    async fn send(&self, notification: &NotificationPayload) -> Result<(), EmailError>;
}

/// SMTP-backed [`NotificationSender`].
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a mailer from configuration.
    ///
    /// No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host is invalid or the sender address
    /// does not parse.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let builder = if config.uses_implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };

        let mailer = builder
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let from = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        Ok(Self { mailer, from })
    }

    fn build_message(&self, notification: &NotificationPayload) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notification.subject.clone());

        for recipient in &notification.recipients {
            let mailbox: Mailbox = recipient
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(recipient.to_string()))?;
            builder = builder.to(mailbox);
        }

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(notification.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(notification.html.clone()),
                ),
        )?;

        Ok(message)
    }
}

#[async_trait]
impl NotificationSender for SmtpMailer {
    async fn send(&self, notification: &NotificationPayload) -> Result<(), EmailError> {
        let message = self.build_message(notification)?;
        self.mailer.send(message).await?;

        tracing::info!(
            recipients = notification.recipients.len(),
            subject = %notification.subject,
            "Notification email sent"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quote_checkout_core::EmailAddress;
    use secrecy::SecretString;

    use super::*;

    // Building the pooled transport needs a tokio runtime.

    fn config(port: u16, from: &str) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: port,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("hunter2-but-longer"),
            from_address: from.to_string(),
        }
    }

    fn payload(recipients: &[&str]) -> NotificationPayload {
        NotificationPayload {
            recipients: recipients
                .iter()
                .map(|r| EmailAddress::parse(r).unwrap())
                .collect(),
            subject: "New mesh calculator order: #D1".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mailer_builds_for_both_tls_modes() {
        assert!(SmtpMailer::new(&config(587, "Quotes <quotes@example.com>")).is_ok());
        assert!(SmtpMailer::new(&config(465, "quotes@example.com")).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_sender_is_rejected() {
        let err = SmtpMailer::new(&config(587, "not an address")).err().unwrap();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_message_addresses_every_recipient() {
        let mailer = SmtpMailer::new(&config(587, "quotes@example.com")).unwrap();
        let message = mailer
            .build_message(&payload(&["a@x.com", "b@x.com"]))
            .unwrap();

        let to: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(to, vec!["a@x.com", "b@x.com"]);
    }
}
