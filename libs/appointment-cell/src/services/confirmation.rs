use std::path::PathBuf;

use tracing::warn;

use notification_cell::{Attachment, EmailMessage};
use schedule_cell::Slot;
use shared_config::AppConfig;

/// Where and how the confirmation email goes out.
#[derive(Debug, Clone)]
pub struct ConfirmationSettings {
    pub recipient: String,
    pub clinic_name: String,
    pub intake_form_path: Option<PathBuf>,
}

impl ConfirmationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            recipient: config.receiver_email.clone(),
            clinic_name: config.clinic_name.clone(),
            intake_form_path: Some(config.intake_form_path.clone()),
        }
    }

    pub fn subject(&self) -> String {
        format!("Your Upcoming Appointment at {}", self.clinic_name)
    }

    pub fn body(&self, patient_name: &str, slot: &Slot) -> String {
        format!(
            "Dear {},\n\nThis email confirms your appointment for {}.\n\n\
             Please complete the attached intake form before your visit.\n\n\
             Thank you,\n{}",
            patient_name,
            slot.label(),
            self.clinic_name
        )
    }

    /// Builds the confirmation email, attaching the intake form when it can be read.
    pub async fn build_email(&self, patient_name: &str, slot: &Slot) -> EmailMessage {
        let message = EmailMessage::new(&self.recipient, self.subject(), self.body(patient_name, slot));

        let Some(path) = &self.intake_form_path else {
            return message;
        };

        match Attachment::from_path(path).await {
            Ok(attachment) => message.with_attachment(attachment),
            Err(e) => {
                warn!("Attachment not found at {} ({}). Skipping attachment.", path.display(), e);
                message
            }
        }
    }
}
