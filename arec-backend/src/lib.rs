//! Personal daily-briefing backend.
//!
//! Markdown files under a data directory hold the operator's tasks, inbox,
//! memory notes, and meeting summaries. On top of them sit a server-rendered
//! dashboard with mutation APIs, a Slack DM assistant, and a one-shot
//! morning briefing that pulls calendar and email from Microsoft Graph,
//! writes the briefing with Claude, and delivers it over Slack.

use std::sync::Arc;

pub mod ai;
pub mod assistant;
pub mod briefing;
pub mod config;
pub mod controllers;
pub mod graph;
pub mod http;
pub mod slack;
pub mod store;

use assistant::Assistant;
use config::Config;
use store::{MeetingStore, MemoryReader, TaskStore};

/// Shared state handed to every request handler.
pub struct AppState {
    pub config: Config,
    pub tasks: Arc<TaskStore>,
    pub meetings: Arc<MeetingStore>,
    pub reader: Arc<MemoryReader>,
    /// None when the Claude or Slack credentials are missing; the events
    /// endpoint still acknowledges but drops the message.
    pub assistant: Option<Arc<Assistant>>,
}
