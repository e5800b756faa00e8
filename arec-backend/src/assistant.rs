//! Slack DM assistant pipeline
//!
//! Each direct message is processed in one pass: load memory and chat
//! history, call Claude with the memory context wrapped around the message,
//! execute any action markers in the reply, log the capture to the inbox,
//! persist history, and post the cleaned reply back to the channel.
//!
//! Failures anywhere in the pass are captured to the inbox as an ERROR entry
//! and answered with an apology message instead of silence.

use crate::ai::actions::{execute_actions, parse_actions};
use crate::ai::{prompts, ChatMessage, ClaudeClient};
use crate::config::defaults;
use crate::slack::SlackClient;
use crate::store::{MemoryReader, TaskStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Words that mark a message as a lookup rather than feedback
const QUERY_WORDS: [&str; 7] = ["what", "who", "when", "where", "how", "tell me", "show me"];

fn detect_intent(response: &str, user_message: &str) -> &'static str {
    if response.contains("[ACTION:TASK|") {
        return "TASK";
    }
    if response.contains("[ACTION:MEMORY|") {
        return "MEMORY_UPDATE";
    }
    let lowered = user_message.to_lowercase();
    if QUERY_WORDS.iter().any(|q| lowered.contains(q)) {
        return "QUERY";
    }
    "FEEDBACK"
}

pub struct Assistant {
    claude: ClaudeClient,
    slack: SlackClient,
    store: Arc<TaskStore>,
    reader: Arc<MemoryReader>,
    history_path: PathBuf,
}

impl Assistant {
    pub fn new(
        claude: ClaudeClient,
        slack: SlackClient,
        store: Arc<TaskStore>,
        reader: Arc<MemoryReader>,
        history_path: PathBuf,
    ) -> Self {
        Self {
            claude,
            slack,
            store,
            reader,
            history_path,
        }
    }

    /// Last conversation turns from disk. A missing or unreadable history
    /// file starts the conversation fresh rather than failing.
    fn load_history(&self) -> Vec<ChatMessage> {
        let raw = match std::fs::read_to_string(&self.history_path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        let mut history: Vec<ChatMessage> = match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(_) => return Vec::new(),
        };
        let excess = history.len().saturating_sub(defaults::HISTORY_LIMIT);
        history.drain(..excess);
        history
    }

    fn save_history(&self, mut history: Vec<ChatMessage>) -> Result<(), String> {
        let excess = history.len().saturating_sub(defaults::HISTORY_LIMIT);
        history.drain(..excess);

        if let Some(parent) = self.history_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create history dir: {}", e))?;
        }
        let raw = serde_json::to_string_pretty(&history)
            .map_err(|e| format!("Failed to serialize history: {}", e))?;
        std::fs::write(&self.history_path, raw)
            .map_err(|e| format!("Failed to write history: {}", e))
    }

    async fn process_dm(&self, channel: &str, text: &str) -> Result<(), String> {
        let memory = self.reader.load_all();
        let mut history = self.load_history();

        let context = prompts::chat_context(text, &memory);
        let mut messages = history.clone();
        messages.push(ChatMessage::user(context));

        let response = self
            .claude
            .generate(prompts::CHAT_SYSTEM_PROMPT, messages, defaults::CHAT_MAX_TOKENS)
            .await?;

        let (actions, clean_response) = parse_actions(&response);
        let intent = detect_intent(&response, text);
        execute_actions(&actions, &self.store);

        self.store
            .append_inbox(text, intent)
            .map_err(|e| format!("Failed to log to inbox: {}", e))?;

        history.push(ChatMessage::user(text));
        history.push(ChatMessage::assistant(clean_response.clone()));
        self.save_history(history)?;

        self.slack.post_message(channel, &clean_response).await?;
        log::info!("[ASSISTANT] Handled {} message", intent);
        Ok(())
    }

    /// Process one direct message end to end. Errors are answered in-channel
    /// and recorded in the inbox; this never returns a failure to the event
    /// endpoint, which always acknowledges.
    pub async fn handle_dm(&self, channel: &str, text: &str) {
        if let Err(e) = self.process_dm(channel, text).await {
            log::error!("[ASSISTANT] Error processing message: {}", e);
            if let Err(log_err) = self
                .store
                .append_inbox(&format!("Error processing message: {}", e), "ERROR")
            {
                log::error!("[ASSISTANT] Could not record error: {}", log_err);
            }
            let apology = format!("Sorry, I encountered an error: {}", e);
            if let Err(post_err) = self.slack.post_message(channel, &apology).await {
                log::error!("[ASSISTANT] Could not post error reply: {}", post_err);
            }
        }
    }
}
