use async_trait::async_trait;
use dispatch_core::{Capability, CapabilityFault, CapabilityInput, CapabilityKind, MessageRequest};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::wrong_input;
use crate::config::EmailConfig;

/// Sends a plain-text email over SMTP with STARTTLS.
pub struct EmailCapability {
    config: EmailConfig,
}

impl EmailCapability {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    async fn send(&self, request: &MessageRequest) -> Result<(), String> {
        let (Some(sender), Some(password)) = (&self.config.sender, &self.config.password) else {
            return Err("SMTP_EMAIL or SMTP_PASSWORD not set correctly".to_string());
        };

        let from: Mailbox = sender
            .parse()
            .map_err(|e| format!("invalid sender address '{}': {}", sender, e))?;
        let to: Mailbox = request
            .recipient
            .parse()
            .map_err(|e| format!("invalid recipient address: {}", e))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(request.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(request.body.clone())
            .map_err(|e| e.to_string())?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| e.to_string())?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(sender.clone(), password.clone()))
            .build();

        mailer.send(message).await.map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[async_trait]
impl Capability for EmailCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::SendMessage
    }

    fn description(&self) -> &str {
        "Send an email to the recipient with the given subject and body"
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        let request = match input {
            CapabilityInput::SendMessage(request) => request,
            other => return Err(wrong_input(self.kind(), &other)),
        };

        match self.send(&request).await {
            Ok(()) => {
                log::info!("Email sent to {}", request.recipient);
                Ok(format!(
                    "Email sent to {} with subject '{}'",
                    request.recipient, request.subject
                ))
            }
            Err(error) => {
                let message = format!("Error sending email to {}: {}", request.recipient, error);
                log::error!("{}", message);
                Ok(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(recipient: &str) -> CapabilityInput {
        MessageRequest {
            recipient: recipient.to_string(),
            subject: "Hacker News Top Headlines".to_string(),
            body: "1. Rust".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn missing_credentials_are_reported() {
        let capability = EmailCapability::new(EmailConfig::default());

        let output = capability.invoke(request("a@b.com")).await.unwrap();

        assert_eq!(
            output,
            "Error sending email to a@b.com: SMTP_EMAIL or SMTP_PASSWORD not set correctly"
        );
    }

    #[tokio::test]
    async fn malformed_recipient_is_reported_before_connecting() {
        let capability = EmailCapability::new(EmailConfig {
            sender: Some("bot@example.com".to_string()),
            password: Some("secret".to_string()),
            ..EmailConfig::default()
        });

        let output = capability.invoke(request("bob,")).await.unwrap();

        assert!(output.starts_with("Error sending email to bob,: invalid recipient address"));
    }

    #[tokio::test]
    async fn rejects_foreign_input() {
        let capability = EmailCapability::new(EmailConfig::default());
        let result = capability
            .invoke(
                dispatch_core::PostRequest {
                    content: "hi".to_string(),
                }
                .into(),
            )
            .await;

        assert_eq!(
            result,
            Err(CapabilityFault::InvalidInput {
                expected: CapabilityKind::SendMessage,
                actual: CapabilityKind::PostMessage,
            })
        );
    }
}
