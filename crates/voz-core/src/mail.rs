//! SMTP notification sink
//!
//! [`SmtpMailer`] wraps lettre's blocking SMTP transport (implicit TLS, as
//! on port 465) to send plain-text notification emails. Build it with
//! [`SmtpMailer::from_config`]; when no SMTP host is configured that
//! returns `None` and callers fall back to [`crate::LogSink`].

use crate::config::MailConfig;
use crate::{NotificationError, NotificationSink};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Sends notification emails through an SMTP relay
pub struct SmtpMailer {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Build a mailer from config
    ///
    /// Returns `Ok(None)` when `smtp_host` is unset.
    pub fn from_config(config: &MailConfig) -> Result<Option<Self>, NotificationError> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(None);
        };

        let from = config
            .from_address
            .as_deref()
            .or(config.smtp_user.as_deref())
            .ok_or_else(|| {
                NotificationError::Build("mail.from_address or mail.smtp_user is required".into())
            })?;
        let from: Mailbox = from
            .parse()
            .map_err(|e: lettre::address::AddressError| NotificationError::Address(e.to_string()))?;

        let mut builder = SmtpTransport::relay(host)
            .map_err(|e| NotificationError::Transport(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Some(Self {
            from,
            transport: builder.build(),
        }))
    }

    /// Assemble the message without sending it
    fn build(&self, to: &str, subject: &str, body: &str) -> Result<Message, NotificationError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| NotificationError::Address(e.to_string()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::Build(e.to_string()))
    }
}

impl NotificationSink for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        let email = self.build(to, subject, body)?;
        self.transport
            .send(&email)
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        tracing::info!(to, subject, "Notification email sent");
        Ok(())
    }
}
