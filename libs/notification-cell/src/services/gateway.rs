use async_trait::async_trait;

use crate::models::{DeliveryOutcome, EmailMessage};

/// Outbound email. Implementations report problems through the returned
/// outcome rather than an error, so a send can never abort a booking.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> DeliveryOutcome;
}
