// libs/notification-cell/src/services/relay.rs
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;

use crate::models::{DeliveryOutcome, EmailMessage, RelayAttachment, RelayRequest};
use crate::services::gateway::NotificationGateway;

/// Sends mail through an HTTP mail relay, authenticating as the clinic's
/// sender account.
pub struct MailRelayGateway {
    client: Client,
    endpoint: String,
    sender_email: String,
    sender_password: String,
}

impl MailRelayGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.mail_relay_url.trim_end_matches('/').to_string(),
            sender_email: config.sender_email.clone(),
            sender_password: config.sender_password.clone(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.sender_email.is_empty() && !self.sender_password.is_empty()
    }
}

#[async_trait]
impl NotificationGateway for MailRelayGateway {
    async fn send(&self, message: &EmailMessage) -> DeliveryOutcome {
        if !self.is_configured() {
            warn!("Mail relay credentials not configured. Skipping email.");
            return DeliveryOutcome::Skipped("mail relay credentials not configured".to_string());
        }
        if message.to.trim().is_empty() {
            warn!("No recipient for '{}'. Skipping email.", message.subject);
            return DeliveryOutcome::Skipped("no recipient".to_string());
        }

        let attachments = message
            .attachment
            .iter()
            .map(|attachment| RelayAttachment {
                filename: &attachment.filename,
                content_type: &attachment.content_type,
                content: general_purpose::STANDARD.encode(&attachment.bytes),
            })
            .collect();

        let request_body = RelayRequest {
            from: &self.sender_email,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
            attachments,
        };

        let url = format!("{}/send", self.endpoint);
        debug!("Posting email '{}' to relay {}", message.subject, url);

        let response = match self
            .client
            .post(&url)
            .basic_auth(&self.sender_email, Some(&self.sender_password))
            .json(&request_body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to reach mail relay: {}", e);
                return DeliveryOutcome::Failed(format!("transport error: {}", e));
            }
        };

        let status = response.status();
        if status.is_success() {
            info!("Email '{}' sent to {}", message.subject, message.to);
            return DeliveryOutcome::Sent;
        }

        let error_text = response.text().await.unwrap_or_default();
        error!("Mail relay rejected email ({}): {}", status, error_text);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DeliveryOutcome::Failed(format!("authentication failed: {}", error_text))
            }
            _ => DeliveryOutcome::Failed(format!("HTTP {}: {}", status, error_text)),
        }
    }
}
