// =============================================================================
// Outbound Notifier — SMTP email transport
// =============================================================================
//
// The alert engine treats every notifier failure the same way (no record,
// no retry), so misconfiguration, connection errors, and auth rejections
// all surface as a plain error here.
//
// Credentials and recipients come from the environment:
//   EMAIL_USER        sender address / SMTP login
//   EMAIL_PASSWORD    SMTP password
//   EMAIL_RECIPIENTS  comma-separated recipient list
// =============================================================================

use std::future::Future;

use anyhow::{bail, Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::runtime_config::EmailConfig;

/// Anything that can deliver an alert with a subject and an HTML body.
pub trait Notifier: Send + Sync {
    fn send(&self, subject: &str, body: &str) -> impl Future<Output = Result<()>> + Send;
}

/// SMTP notifier over STARTTLS.
pub struct SmtpNotifier {
    host: String,
    port: u16,
    user: String,
    password: String,
    recipients: Vec<String>,
}

impl SmtpNotifier {
    /// Build from the configured server settings plus credentials and
    /// recipients read from the environment.  Missing credentials are not
    /// an error here — they surface on the first send attempt.
    pub fn from_env(config: &EmailConfig) -> Self {
        let recipients = std::env::var("EMAIL_RECIPIENTS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: config.host.clone(),
            port: config.port,
            user: std::env::var("EMAIL_USER").unwrap_or_default(),
            password: std::env::var("EMAIL_PASSWORD").unwrap_or_default(),
            recipients,
        }
    }

    /// Whether credentials and at least one recipient are present.
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty() && !self.recipients.is_empty()
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        if self.user.is_empty() || self.password.is_empty() {
            bail!("email credentials not configured");
        }
        if self.recipients.is_empty() {
            bail!("no email recipients configured");
        }

        let mut builder = Message::builder()
            .from(self.user.parse().context("invalid sender address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(recipient
                .parse()
                .with_context(|| format!("invalid recipient address {recipient}"))?);
        }
        let email = builder
            .body(body.to_string())
            .context("failed to build email message")?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .with_context(|| format!("failed to create SMTP transport for {}", self.host))?
            .port(self.port)
            .credentials(Credentials::new(self.user.clone(), self.password.clone()))
            .build();

        transport
            .send(email)
            .await
            .context("SMTP send failed")?;

        info!(recipients = self.recipients.len(), "alert email sent");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bare_notifier() -> SmtpNotifier {
        SmtpNotifier {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            recipients: Vec::new(),
        }
    }

    #[test]
    fn unconfigured_notifier_reports_so() {
        assert!(!bare_notifier().is_configured());

        let mut n = bare_notifier();
        n.user = "alerts@example.com".to_string();
        n.password = "secret".to_string();
        assert!(!n.is_configured()); // still no recipients

        n.recipients = vec!["trader@example.com".to_string()];
        assert!(n.is_configured());
    }

    #[tokio::test]
    async fn send_without_credentials_is_an_error() {
        let err = bare_notifier()
            .send("subject", "<p>body</p>")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("credentials"));
    }

    #[tokio::test]
    async fn send_without_recipients_is_an_error() {
        let mut n = bare_notifier();
        n.user = "alerts@example.com".to_string();
        n.password = "secret".to_string();
        let err = n.send("subject", "<p>body</p>").await.unwrap_err();
        assert!(err.to_string().contains("recipients"));
    }
}
