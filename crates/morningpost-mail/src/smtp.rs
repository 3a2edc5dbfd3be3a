//! SMTP notifier — sends the rendered HTML via async lettre.
//!
//! Credentials and server settings are passed in at construction; nothing
//! is read from the environment at send time.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use morningpost_core::config::{SmtpConfig, SmtpTls};
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::traits::Notifier;

pub struct SmtpNotifier {
    from: Mailbox,
    subject: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        if config.from.trim().is_empty() {
            return Err(MorningPostError::Config("smtp.from is empty".into()));
        }
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MorningPostError::Config(format!("Invalid from '{}': {e}", config.from)))?;

        let builder = match config.tls {
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MorningPostError::Config(format!("SMTP relay: {e}")))?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MorningPostError::Config(format!("SMTP relay: {e}")))?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };
        let mut builder = builder.port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        tracing::debug!(
            "📧 SMTP notifier: {}:{} ({:?}) as {}",
            config.host,
            config.port,
            config.tls,
            from
        );

        Ok(Self {
            from,
            subject: config.subject.clone(),
            mailer: builder.build(),
        })
    }

    /// Build the HTML message for one recipient.
    pub fn compose(&self, html: &str, to: &str) -> Result<Message> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| MorningPostError::delivery(to, format!("Invalid to: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| MorningPostError::delivery(to, format!("Build email: {e}")))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, message: &str, to: &str) -> Result<()> {
        let email = self.compose(message, to)?;
        self.mailer
            .send(email)
            .await
            .map_err(|e| MorningPostError::delivery(to, format!("SMTP send: {e}")))?;
        tracing::info!("📤 Email sent to: {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            from: "Morning Bot <bot@example.com>".into(),
            subject: "早上好".into(),
            ..SmtpConfig::default()
        }
    }

    #[tokio::test]
    async fn test_compose_html_message() {
        let notifier = SmtpNotifier::from_config(&config()).unwrap();
        let email = notifier
            .compose("<p>Carpe diem</p>", "reader@example.com")
            .unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("To: reader@example.com"));
        assert!(raw.contains("Morning Bot"));
        assert!(raw.contains("<bot@example.com>"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("<p>Carpe diem</p>"));
    }

    #[tokio::test]
    async fn test_bad_recipient_is_delivery_error() {
        let notifier = SmtpNotifier::from_config(&config()).unwrap();
        let err = notifier.compose("x", "not an address").unwrap_err();
        assert!(matches!(err, MorningPostError::Delivery { .. }));
    }

    #[tokio::test]
    async fn test_missing_or_bad_sender_is_config_error() {
        let mut cfg = config();
        cfg.from = String::new();
        assert!(matches!(
            SmtpNotifier::from_config(&cfg).err().unwrap(),
            MorningPostError::Config(_)
        ));
        cfg.from = "no at sign".into();
        assert!(SmtpNotifier::from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn test_every_tls_mode_builds() {
        for tls in [SmtpTls::Starttls, SmtpTls::Tls, SmtpTls::None] {
            let cfg = SmtpConfig {
                tls,
                username: "bot".into(),
                password: "secret".into(),
                ..config()
            };
            assert!(SmtpNotifier::from_config(&cfg).is_ok(), "{tls:?}");
        }
    }
}
