use serde::{Deserialize, Serialize};

/// Kind of event pushed to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    MeetingScheduled,
    MeetingCancelled,
    DocumentSent,
    SignatureCompleted,
    SignatureFailed,
    MediationFinalized,
}

/// Fire-and-forget notification payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub event_type: NotificationType,
    pub title: String,
    pub message: String,
}

impl NotificationEvent {
    pub fn new(
        event_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            title: title.into(),
            message: message.into(),
        }
    }
}
