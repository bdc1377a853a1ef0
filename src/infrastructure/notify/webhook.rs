use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{
    entities::contact::SubmissionRecord,
    errors::AppError,
    infrastructure::notify::message::NotificationMessage,
    repositories::notifier::Notifier,
};

/// Posts the notification as JSON to a mail relay or chat webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: Url,
    sender: String,
    recipient: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: Url, sender: impl Into<String>, recipient: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Configuration(format!("Webhook client: {}", e)))?;

        Ok(WebhookNotifier {
            client,
            endpoint,
            sender: sender.into(),
            recipient: recipient.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), AppError> {
        let message = NotificationMessage::for_submission(record, &self.sender, &self.recipient);

        self.client
            .post(self.endpoint.clone())
            .json(&message)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(endpoint = %self.endpoint, "notification delivered");
        Ok(())
    }
}
