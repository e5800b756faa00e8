//! Slack Web API client
//!
//! Slack answers HTTP 200 even for application errors and signals failure
//! with `ok: false` in the body, so every response body is checked.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Deserialize)]
struct SlackChannel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ConversationsOpenResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<SlackChannel>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    bot_token: String,
}

impl SlackClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            bot_token,
        }
    }

    async fn call(&self, method: &str, payload: serde_json::Value) -> Result<String, String> {
        let response = self
            .client
            .post(format!("{}/{}", SLACK_API_BASE, method))
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Slack API request failed: {}", e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(format!(
                "Slack API returned error status: {}, body: {}",
                status, body
            ));
        }
        Ok(body)
    }

    /// Open (or fetch) the direct message channel with a user.
    pub async fn open_dm(&self, user_id: &str) -> Result<String, String> {
        let body = self
            .call("conversations.open", json!({ "users": user_id }))
            .await?;

        let parsed: ConversationsOpenResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse Slack response: {}", e))?;

        if !parsed.ok {
            return Err(format!(
                "Slack post failed: {}",
                parsed.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        parsed
            .channel
            .map(|c| c.id)
            .ok_or_else(|| "Slack response missing channel id".to_string())
    }

    /// Post a markdown-formatted message to a channel.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), String> {
        let body = self
            .call(
                "chat.postMessage",
                json!({ "channel": channel, "text": text, "mrkdwn": true }),
            )
            .await?;

        let parsed: PostMessageResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse Slack response: {}", e))?;

        if !parsed.ok {
            return Err(format!(
                "Slack post failed: {}",
                parsed.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        Ok(())
    }

    /// Post a direct message to a user by opening their DM channel first.
    pub async fn post_dm(&self, user_id: &str, text: &str) -> Result<(), String> {
        let channel = self.open_dm(user_id).await?;
        self.post_message(&channel, text).await?;
        log::info!("[SLACK] Posted DM to {}", user_id);
        Ok(())
    }
}
