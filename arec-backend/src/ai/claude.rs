//! Anthropic messages API client
//!
//! One call per generation, no retry layer. A failed request surfaces to
//! the caller, which logs it or answers with a failure message.

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One turn in a conversation, also the on-disk history record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, String> {
        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let auth_value = header::HeaderValue::from_str(api_key)
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        auth_headers.insert("x-api-key", auth_value);
        auth_headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        Ok(Self {
            client: crate::http::shared_client().clone(),
            auth_headers,
            endpoint: ANTHROPIC_ENDPOINT.to_string(),
            model: model.to_string(),
        })
    }

    /// Run one completion and return the concatenated text blocks.
    pub async fn generate(
        &self,
        system: &str,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<String, String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            system: Some(system.to_string()),
        };

        log::debug!("[CLAUDE] Sending request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.auth_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Claude API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(format!("Claude API error: {}", error_response.error.message));
            }
            return Err(format!(
                "Claude API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let response_data: CompletionResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Claude response: {}", e))?;

        let content: String = response_data
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.clone())
            .collect();

        if content.is_empty() {
            return Err("Claude API returned no content".to_string());
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hello").role, "assistant");
    }

    #[test]
    fn test_request_omits_empty_optional_fields() {
        let request = CompletionRequest {
            model: "claude-sonnet-4-6".to_string(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: 100,
            system: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("system"));
    }

    #[test]
    fn test_response_text_concatenation_shape() {
        let data: CompletionResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "text", "text": "Good "},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "morning."}
            ]}"#,
        )
        .unwrap();
        let content: String = data
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.clone())
            .collect();
        assert_eq!(content, "Good morning.");
    }

    #[test]
    fn test_new_rejects_invalid_api_key() {
        assert!(ClaudeClient::new("bad\nkey", "claude-sonnet-4-6").is_err());
    }
}
