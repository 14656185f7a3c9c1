use crate::message::{Attachment, ChatMessage};
use crate::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

// ============================================================================
// Slack 通知
// ============================================================================

#[derive(Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub channel: String,
    pub token: String,

    /// 默认为 chat.postMessage，测试时可指向本地服务
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    SLACK_POST_MESSAGE_URL.to_string()
}

impl SlackConfig {
    pub fn new(channel: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            token: token.into(),
            api_url: default_api_url(),
        }
    }
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("channel", &self.channel)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    attachments: &'a [Attachment],
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackNotifier {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_message(&self, message: &ChatMessage) -> serde_json::Value {
        serde_json::json!(PostMessage {
            channel: &self.config.channel,
            text: &message.text,
            attachments: &message.attachments,
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, message: &ChatMessage) -> Result<(), NotifyError> {
        let body = self.build_message(message);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        let reply: PostMessageResponse = response.json().await?;
        if !reply.ok {
            return Err(NotifyError::Api(
                reply.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        debug!(channel = %self.config.channel, "Slack message posted");
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}
