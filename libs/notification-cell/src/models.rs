use std::path::Path;

use serde::{Deserialize, Serialize};

use shared_models::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
            _ => "application/octet-stream",
        };

        Ok(Self {
            filename,
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Result of a send attempt. Never fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    Sent,
    Skipped(String),
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }

    /// The outcome as a reportable error, for callers that log failures.
    pub fn error(&self) -> Option<AppError> {
        match self {
            DeliveryOutcome::Failed(reason) => Some(AppError::Notification(reason.clone())),
            _ => None,
        }
    }
}

/// Body posted to the mail relay.
#[derive(Debug, Serialize)]
pub struct RelayRequest<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub text: &'a str,
    pub attachments: Vec<RelayAttachment<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RelayAttachment<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    /// Base64 (standard alphabet) of the file bytes.
    pub content: String,
}
