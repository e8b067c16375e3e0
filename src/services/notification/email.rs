use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::email::EmailConfig;

use super::{EmailMessage, EmailSender, NotifyError};

/// Sends HTML email over SMTP (STARTTLS unless disabled)
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotifyError> {
        let smtp_host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| NotifyError::Send("SMTP host is not configured".to_string()))?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
                .map_err(|e| NotifyError::Send(format!("Failed to create SMTP transport: {}", e)))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse::<Mailbox>()
            .or_else(|_| config.from_address.parse::<Mailbox>())
            .map_err(|_| NotifyError::InvalidEmail(config.from_address.clone()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let to: Mailbox = message
            .recipient
            .parse()
            .map_err(|_| NotifyError::InvalidEmail(message.recipient.clone()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.body_html.clone())
            .map_err(|e| NotifyError::Send(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: Option<&str>) -> EmailConfig {
        EmailConfig {
            smtp_host: host.map(String::from),
            smtp_port: 2525,
            username: "user".to_string(),
            password: "pass".to_string(),
            from_address: "assistant@dumpsheet.com".to_string(),
            from_name: "Dumpsheet Assistant".to_string(),
            use_tls: false,
        }
    }

    #[test]
    fn test_requires_smtp_host() {
        assert!(matches!(
            SmtpEmailSender::from_config(&config(None)),
            Err(NotifyError::Send(_))
        ));
    }

    #[test]
    fn test_builds_sender_with_named_from() {
        let sender = SmtpEmailSender::from_config(&config(Some("localhost"))).unwrap();
        assert_eq!(sender.from.email.to_string(), "assistant@dumpsheet.com");
        assert_eq!(sender.from.name.as_deref(), Some("Dumpsheet Assistant"));
    }
}
