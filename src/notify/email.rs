//! Email delivery over an HTTP mail API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::render::{broker_message, completion_message, personal_message, Message};
use super::Notifier;
use crate::common::errors::{AlerterError, Result};
use crate::config::types::{AllocationConfig, NotifyConfig};
use crate::trigger::TriggerRecord;

/// Notifier that posts rendered messages to an HTTP mail API.
///
/// Without an API token it degrades to logging the full message at `info`
/// and reporting success, so the trigger pipeline can run end to end in a
/// credential-less environment.
pub struct HttpEmailNotifier {
    client: Client,
    config: NotifyConfig,
    allocations: AllocationConfig,
    max_triggers: u32,
}

impl HttpEmailNotifier {
    /// Create a notifier with the default 10 s delivery timeout
    pub fn new(
        config: NotifyConfig,
        allocations: AllocationConfig,
        max_triggers: u32,
    ) -> Result<Self> {
        Self::with_timeout(config, allocations, max_triggers, Duration::from_secs(10))
    }

    /// Create a notifier with a custom delivery timeout
    pub fn with_timeout(
        config: NotifyConfig,
        allocations: AllocationConfig,
        max_triggers: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AlerterError::Transport)?;

        Ok(Self {
            client,
            config,
            allocations,
            max_triggers,
        })
    }

    async fn deliver(&self, to: &str, message: &Message) -> Result<()> {
        let token = match &self.config.api_token {
            Some(token) => token,
            None => {
                info!(
                    to,
                    subject = %message.subject,
                    "mail API token not configured, logging message instead\n{}",
                    message.body
                );
                return Ok(());
            }
        };

        debug!(to, subject = %message.subject, "delivering notification");

        let payload = json!({
            "from": self.config.sender,
            "to": to,
            "subject": message.subject,
            "text": message.body,
        });

        let response = self
            .client
            .post(&self.config.mail_api_url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AlerterError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AlerterError::Notification(format!(
                "mail API returned status {}: {}",
                status, body
            )));
        }

        info!(to, subject = %message.subject, "notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    #[instrument(skip(self, record), fields(sequence = record.sequence_number))]
    async fn notify(&self, record: &TriggerRecord) -> Result<()> {
        let broker = broker_message(record, &self.allocations, self.max_triggers);
        let personal = personal_message(record, &self.allocations, self.max_triggers);

        // Attempt both recipients even if the first delivery fails
        let broker_result = self.deliver(&self.config.broker_recipient, &broker).await;
        let personal_result = self
            .deliver(&self.config.personal_recipient, &personal)
            .await;

        broker_result.and(personal_result)
    }

    #[instrument(skip(self, history))]
    async fn notify_completion(&self, history: &[TriggerRecord]) -> Result<()> {
        let message = completion_message(history, &self.allocations, self.max_triggers);
        self.deliver(&self.config.personal_recipient, &message).await
    }
}
