//! Slack 渠道
//!
//! 调用 Slack Web API `chat.postMessage` 发送消息。
//! 单次同步请求，不重试、不排队；超时使用 reqwest 默认值。

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::channel::{NotificationChannel, NotificationMessage};
use crate::error::{Result, WrapError};

/// Slack Web API 基础 URL
pub const SLACK_API_URL: &str = "https://slack.com/api";

/// chat.postMessage 请求载荷
#[derive(Debug, Serialize)]
pub struct PostMessagePayload<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    pub icon_emoji: &'a str,
    pub username: &'a str,
}

impl<'a> From<&'a NotificationMessage> for PostMessagePayload<'a> {
    fn from(message: &'a NotificationMessage) -> Self {
        Self {
            channel: &message.channel,
            text: &message.text,
            icon_emoji: &message.icon_emoji,
            username: &message.username,
        }
    }
}

/// Slack API 响应
#[derive(Debug, Deserialize)]
pub struct SlackResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Slack 渠道
#[derive(Debug)]
pub struct SlackChannel {
    client: Client,
    token: String,
    api_url: String,
}

impl SlackChannel {
    /// 创建 Slack 渠道
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_url(token, SLACK_API_URL)
    }

    /// 指定 API 地址（测试时指向本地 stub）
    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(WrapError::usage("slack-token is required"));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| WrapError::delivery(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn post_message_url(&self) -> String {
        format!("{}/chat.postMessage", self.api_url)
    }
}

impl NotificationChannel for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    fn send(&self, message: &NotificationMessage) -> Result<()> {
        let url = self.post_message_url();
        debug!(url = %url, channel = %message.channel, "Posting message to Slack");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&PostMessagePayload::from(message))
            .send()
            .map_err(|e| WrapError::delivery(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| WrapError::delivery(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(WrapError::delivery(format!(
                "Slack API returned {}: {}",
                status, body
            )));
        }

        let slack_response: SlackResponse = serde_json::from_str(&body).map_err(|e| {
            WrapError::delivery(format!("failed to parse response: {} - body: {}", e, body))
        })?;

        if !slack_response.ok {
            return Err(WrapError::delivery(format!(
                "Slack API error: {}",
                slack_response.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        info!(channel = %message.channel, "Notification sent to Slack");
        Ok(())
    }
}
