use crate::config::NotificationConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    InApp,
    Push,
    /// 运营频道（实物奖品需人工处理）
    Ops,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub user_id: Option<i64>,
    pub channel: NotificationChannel,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub metadata: Value,
}

impl Notification {
    pub fn to_user(user_id: i64, channel: NotificationChannel, title: &str, body: String) -> Self {
        Self {
            user_id: Some(user_id),
            channel,
            title: title.to_string(),
            body,
            target: None,
            metadata: Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Outbound notification gateway. Delivery never affects the reward that
/// triggered it.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(config: NotificationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client for notifications: {e}");
                Client::new()
            });
        Self { client, config }
    }

    pub fn disabled() -> Self {
        Self::new(NotificationConfig::default())
    }

    pub async fn send(&self, mut notification: Notification) -> AppResult<()> {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            return Ok(());
        };
        if notification.channel == NotificationChannel::Ops {
            notification.target = self.config.ops_channel.clone();
        }

        let response = self.client.post(endpoint).json(&notification).send().await?;

        if response.status().is_success() {
            log::debug!(
                "Notification {:?} delivered for user {:?}",
                notification.channel,
                notification.user_id
            );
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Notification gateway returned {status}: {error_text}"
            )))
        }
    }

    /// Fire-and-forget. Failures are logged and swallowed.
    pub fn notify_best_effort(&self, notification: Notification) {
        if self.config.endpoint.is_none() {
            log::info!(
                "Notification ({:?}) for user {:?}: {} - {}",
                notification.channel,
                notification.user_id,
                notification.title,
                notification.body
            );
            return;
        }

        let notifier = self.clone();
        tokio::spawn(async move {
            let channel = notification.channel;
            let user_id = notification.user_id;
            if let Err(e) = notifier.send(notification).await {
                log::warn!("Failed to deliver {channel:?} notification for user {user_id:?}: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_without_endpoint_is_a_no_op() {
        let notifier = Notifier::disabled();
        let n = Notification::to_user(1, NotificationChannel::Email, "Hi", "body".into());
        assert!(notifier.send(n.clone()).await.is_ok());
        notifier.notify_best_effort(n);
    }

    #[tokio::test]
    async fn unreachable_gateway_is_swallowed_by_best_effort() {
        let notifier = Notifier::new(NotificationConfig {
            endpoint: Some("http://127.0.0.1:9/notify".to_string()),
            ops_channel: Some("#ops".to_string()),
            timeout_ms: 200,
        });
        let n = Notification::to_user(1, NotificationChannel::Ops, "Prize", "ship it".into());
        assert!(notifier.send(n.clone()).await.is_err());
        notifier.notify_best_effort(n);
    }

    #[test]
    fn payload_uses_snake_case_channel() {
        let n = Notification::to_user(3, NotificationChannel::InApp, "t", "b".into())
            .with_metadata(serde_json::json!({"code": "SPIN-ABC123"}));
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["channel"], "in_app");
        assert_eq!(v["metadata"]["code"], "SPIN-ABC123");
        assert!(v.get("target").is_none());
    }
}
