use async_trait::async_trait;

use crate::{
    entities::contact::SubmissionRecord,
    errors::AppError,
    infrastructure::notify::message::NotificationMessage,
    repositories::notifier::Notifier,
};

/// Used when no webhook is configured: the notification goes to the log.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    sender: String,
    recipient: String,
}

impl LogNotifier {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>) -> Self {
        LogNotifier {
            sender: sender.into(),
            recipient: recipient.into(),
        }
    }

    pub fn message_for(&self, record: &SubmissionRecord) -> NotificationMessage {
        NotificationMessage::for_submission(record, &self.sender, &self.recipient)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), AppError> {
        let message = self.message_for(record);
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "contact notification"
        );
        Ok(())
    }
}
