use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};

use crate::config::Config;

/// Outbound mail service constructed once at startup. Without SMTP
/// credentials it runs in degraded mode: the message body is logged and the
/// send still succeeds, so OTP and reset flows keep working in development.
pub struct Mailer {
    transport: Option<SmtpTransport>,
    from: String,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("transport", &self.transport.is_some())
            .field("from", &self.from)
            .finish()
    }
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        if config.smtp_username.is_empty() || config.smtp_password.is_empty() {
            tracing::warn!("SMTP credentials not configured - emails will be logged instead");
            return Mailer {
                transport: None,
                from: config.smtp_from.clone(),
            };
        }

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        match SmtpTransport::relay(&config.smtp_host) {
            Ok(builder) => Mailer {
                transport: Some(builder.credentials(credentials).build()),
                from: config.smtp_from.clone(),
            },
            Err(e) => {
                tracing::warn!("Failed to set up SMTP relay {}: {} - emails will be logged", config.smtp_host, e);
                Mailer {
                    transport: None,
                    from: config.smtp_from.clone(),
                }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.transport.is_none()
    }

    pub fn send(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if to_email.is_empty() || !to_email.contains('@') {
            return Err(format!("Invalid email address: {}", to_email).into());
        }

        let Some(transport) = &self.transport else {
            tracing::info!("[mail:degraded] to={} subject={:?} body={:?}", to_email, subject, body);
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(&email)?;
        tracing::info!("Email sent to {}", to_email);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degraded_mailer() -> Mailer {
        Mailer {
            transport: None,
            from: "Boretrack <noreply@boretrack.local>".to_string(),
        }
    }

    #[test]
    fn degraded_mailer_accepts_valid_recipient() {
        let mailer = degraded_mailer();
        assert!(mailer.is_degraded());
        assert!(mailer.send("ada@example.com", "OTP", "123456").is_ok());
    }

    #[test]
    fn invalid_recipient_is_rejected_even_when_degraded() {
        let mailer = degraded_mailer();
        assert!(mailer.send("", "OTP", "123456").is_err());
        assert!(mailer.send("not-an-email", "OTP", "123456").is_err());
    }
}
