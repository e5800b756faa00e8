//! Morning briefing orchestration
//!
//! One pass: load memory, fetch calendar and email from Graph, generate the
//! narrative with Claude, post it as a Slack DM. Any failure aborts the run
//! and surfaces to the caller; there is no partial delivery.

use crate::ai::{prompts, ChatMessage, ClaudeClient};
use crate::config::{self, Config};
use crate::graph::{GraphAuth, GraphClient};
use crate::slack::SlackClient;
use crate::store::MemoryReader;

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, String> {
    value.as_deref().ok_or_else(|| format!("{} is not set", name))
}

pub async fn run_briefing(config: &Config) -> Result<(), String> {
    log::info!("[BRIEFING] Morning briefing starting");

    let api_key = require(&config.anthropic_api_key, config::env_vars::ANTHROPIC_API_KEY)?;
    let bot_token = require(&config.slack_bot_token, config::env_vars::SLACK_BOT_TOKEN)?;
    let slack_user = require(&config.slack_user_id, config::env_vars::SLACK_USER_ID)?;
    let ms_user = require(&config.ms_user_id, config::env_vars::MS_USER_ID)?;
    let client_id = require(&config.azure_client_id, config::env_vars::AZURE_CLIENT_ID)?;
    let tenant_id = require(&config.azure_tenant_id, config::env_vars::AZURE_TENANT_ID)?;

    let memory = MemoryReader::new(config::memory_config()).load_all();
    log::info!(
        "[BRIEFING] Memory loaded: {} tasks, {} people.",
        memory.task_count(),
        memory.people.len()
    );

    let auth = GraphAuth::new(
        client_id.to_string(),
        tenant_id.to_string(),
        config::token_cache_path(),
    );
    let graph = GraphClient::new(auth, ms_user.to_string());

    let events = graph
        .get_todays_events(config.briefing.calendar_days_ahead)
        .await?;
    log::info!("[BRIEFING] Calendar: {} events.", events.len());

    let emails = graph
        .get_recent_emails(
            config.briefing.email_scan_hours,
            config.briefing.email_max_results,
        )
        .await?;
    log::info!("[BRIEFING] Email: {} messages.", emails.len());

    let claude = ClaudeClient::new(api_key, &config.claude_model)?;
    let prompt = prompts::briefing_prompt(&events, &emails, &memory);
    let briefing = claude
        .generate(
            prompts::BRIEFING_SYSTEM_PROMPT,
            vec![ChatMessage::user(prompt)],
            config::defaults::BRIEFING_MAX_TOKENS,
        )
        .await?;
    log::info!("[BRIEFING] Briefing generated ({} chars).", briefing.len());

    SlackClient::new(bot_token.to_string())
        .post_dm(slack_user, &briefing)
        .await?;
    log::info!("[BRIEFING] Briefing delivered to Slack.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_names_the_missing_variable() {
        let err = require(&None, "ANTHROPIC_API_KEY").unwrap_err();
        assert_eq!(err, "ANTHROPIC_API_KEY is not set");

        let value = Some("secret".to_string());
        assert_eq!(require(&value, "ANTHROPIC_API_KEY").unwrap(), "secret");
    }
}
