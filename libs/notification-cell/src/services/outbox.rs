use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{DeliveryOutcome, EmailMessage};
use crate::services::gateway::NotificationGateway;

/// Keeps every message in memory instead of sending it.
pub struct OutboxGateway {
    messages: Mutex<Vec<EmailMessage>>,
    outcome: DeliveryOutcome,
}

impl Default for OutboxGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboxGateway {
    pub fn new() -> Self {
        Self::with_outcome(DeliveryOutcome::Sent)
    }

    /// An outbox that records messages but reports `outcome` for each one.
    pub fn with_outcome(outcome: DeliveryOutcome) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            outcome,
        }
    }

    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl NotificationGateway for OutboxGateway {
    async fn send(&self, message: &EmailMessage) -> DeliveryOutcome {
        info!(
            to = %message.to,
            attachment = message.attachment.as_ref().map(|a| a.filename.as_str()).unwrap_or("none"),
            "Outbox email: {}",
            message.subject
        );
        self.messages.lock().await.push(message.clone());
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages_in_order() {
        let outbox = OutboxGateway::new();
        outbox.send(&EmailMessage::new("a@example.com", "first", "body")).await;
        outbox.send(&EmailMessage::new("b@example.com", "second", "body")).await;

        let subjects: Vec<String> = outbox.messages().await.into_iter().map(|m| m.subject).collect();
        assert_eq!(subjects, ["first", "second"]);
    }

    #[tokio::test]
    async fn reports_configured_outcome() {
        let outbox = OutboxGateway::with_outcome(DeliveryOutcome::Failed("smtp down".into()));
        let outcome = outbox.send(&EmailMessage::new("a@example.com", "s", "b")).await;

        assert_eq!(outcome, DeliveryOutcome::Failed("smtp down".into()));
        assert_eq!(outbox.len().await, 1);
    }
}
