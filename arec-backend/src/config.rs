use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    /// Root of the markdown data workspace (tasks, inbox, memory, meeting summaries).
    /// Point this at the synced folder when running against live data.
    pub const DATA_DIR: &str = "DATA_DIR";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const CLAUDE_MODEL: &str = "CLAUDE_MODEL";
    pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
    /// Slack member id of the briefing recipient (starts with U).
    pub const SLACK_USER_ID: &str = "SLACK_USER_ID";
    /// Microsoft Graph object id of the mailbox/calendar owner.
    pub const MS_USER_ID: &str = "MS_USER_ID";
    pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
    pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
    pub const CALENDAR_DAYS_AHEAD: &str = "CALENDAR_DAYS_AHEAD";
    pub const EMAIL_SCAN_HOURS: &str = "EMAIL_SCAN_HOURS";
    pub const EMAIL_MAX_RESULTS: &str = "EMAIL_MAX_RESULTS";
    pub const MEETING_LOOKBACK_DAYS: &str = "MEETING_LOOKBACK_DAYS";
    pub const TOKEN_CACHE_PATH: &str = "TOKEN_CACHE_PATH";
    pub const HISTORY_PATH: &str = "HISTORY_PATH";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 3001;
    pub const DATA_DIR: &str = "data";
    pub const CLAUDE_MODEL: &str = "claude-sonnet-4-6";
    pub const CALENDAR_DAYS_AHEAD: i64 = 1;
    pub const EMAIL_SCAN_HOURS: i64 = 18;
    pub const EMAIL_MAX_RESULTS: u32 = 15;
    pub const MEETING_LOOKBACK_DAYS: i64 = 7;
    pub const MEETING_SUMMARIES_DIR: &str = "meeting-summaries";
    pub const MEETING_ARCHIVE_DIR: &str = "archive";
    pub const MEMORY_DIR: &str = "memory";
    pub const PEOPLE_DIR: &str = "people";
    pub const TOKEN_CACHE_FILE: &str = ".graph_token_cache.json";
    pub const HISTORY_FILE: &str = ".conversation_history.json";
    /// Section new tasks land in when the caller names none.
    pub const DEFAULT_TASK_SECTION: &str = "Work — Operations";
    pub const BRIEFING_MAX_TOKENS: u32 = 1500;
    pub const CHAT_MAX_TOKENS: u32 = 1200;
    /// Rolling chat history size in messages (10 user/assistant pairs).
    pub const HISTORY_LIMIT: usize = 20;
}

/// Returns the absolute path to the arec-backend directory.
/// Uses CARGO_MANIFEST_DIR at compile time, so it always resolves
/// to arec-backend/ regardless of the working directory at runtime.
pub fn backend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Get the data workspace directory (env override or ./data)
pub fn data_dir() -> PathBuf {
    match env::var(env_vars::DATA_DIR) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => backend_dir().join(defaults::DATA_DIR),
    }
}

/// Get the task file path (DATA_DIR/TASKS.md)
pub fn tasks_path() -> PathBuf {
    data_dir().join("TASKS.md")
}

/// Get the inbox capture file path (DATA_DIR/inbox.md)
pub fn inbox_path() -> PathBuf {
    data_dir().join("inbox.md")
}

/// Get the memory directory (DATA_DIR/memory)
pub fn memory_dir() -> PathBuf {
    data_dir().join(defaults::MEMORY_DIR)
}

/// Get the people notes directory (DATA_DIR/memory/people)
pub fn people_dir() -> PathBuf {
    memory_dir().join(defaults::PEOPLE_DIR)
}

/// Get the glossary file path (DATA_DIR/memory/glossary.md)
pub fn glossary_path() -> PathBuf {
    memory_dir().join("glossary.md")
}

/// Get the meeting summaries directory (DATA_DIR/meeting-summaries)
pub fn meeting_summaries_dir() -> PathBuf {
    data_dir().join(defaults::MEETING_SUMMARIES_DIR)
}

/// Get the meeting archive directory (DATA_DIR/meeting-summaries/archive)
pub fn meeting_archive_dir() -> PathBuf {
    meeting_summaries_dir().join(defaults::MEETING_ARCHIVE_DIR)
}

/// Get the Graph token cache path (env override or DATA_DIR/.graph_token_cache.json)
pub fn token_cache_path() -> PathBuf {
    match env::var(env_vars::TOKEN_CACHE_PATH) {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join(defaults::TOKEN_CACHE_FILE),
    }
}

/// Get the chat history path (env override or DATA_DIR/.conversation_history.json)
pub fn history_path() -> PathBuf {
    match env::var(env_vars::HISTORY_PATH) {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join(defaults::HISTORY_FILE),
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub claude_model: String,
    pub anthropic_api_key: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_user_id: Option<String>,
    pub ms_user_id: Option<String>,
    pub azure_client_id: Option<String>,
    pub azure_tenant_id: Option<String>,
    pub briefing: BriefingConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            claude_model: env::var(env_vars::CLAUDE_MODEL)
                .unwrap_or_else(|_| defaults::CLAUDE_MODEL.to_string()),
            anthropic_api_key: env::var(env_vars::ANTHROPIC_API_KEY).ok(),
            slack_bot_token: env::var(env_vars::SLACK_BOT_TOKEN).ok(),
            slack_user_id: env::var(env_vars::SLACK_USER_ID).ok(),
            ms_user_id: env::var(env_vars::MS_USER_ID).ok(),
            azure_client_id: env::var(env_vars::AZURE_CLIENT_ID).ok(),
            azure_tenant_id: env::var(env_vars::AZURE_TENANT_ID).ok(),
            briefing: BriefingConfig::from_env(),
        }
    }
}

/// Tunables for the briefing run
#[derive(Clone, Debug)]
pub struct BriefingConfig {
    /// How many days of calendar to pull starting at local midnight
    pub calendar_days_ahead: i64,
    /// Email lookback window in hours
    pub email_scan_hours: i64,
    /// Maximum emails fetched per run
    pub email_max_results: u32,
    /// Meeting summaries older than this many days are excluded
    pub meeting_lookback_days: i64,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            calendar_days_ahead: defaults::CALENDAR_DAYS_AHEAD,
            email_scan_hours: defaults::EMAIL_SCAN_HOURS,
            email_max_results: defaults::EMAIL_MAX_RESULTS,
            meeting_lookback_days: defaults::MEETING_LOOKBACK_DAYS,
        }
    }
}

impl BriefingConfig {
    pub fn from_env() -> Self {
        let parse_i64 = |var: &str, fallback: i64| {
            env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(fallback)
        };
        Self {
            calendar_days_ahead: parse_i64(env_vars::CALENDAR_DAYS_AHEAD, defaults::CALENDAR_DAYS_AHEAD),
            email_scan_hours: parse_i64(env_vars::EMAIL_SCAN_HOURS, defaults::EMAIL_SCAN_HOURS),
            email_max_results: env::var(env_vars::EMAIL_MAX_RESULTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::EMAIL_MAX_RESULTS),
            meeting_lookback_days: parse_i64(env_vars::MEETING_LOOKBACK_DAYS, defaults::MEETING_LOOKBACK_DAYS),
        }
    }
}

/// Configuration for the markdown memory files read into the briefing bundle
#[derive(Clone, Debug)]
pub struct MemoryConfig {
    /// Base directory holding the markdown workspace
    pub base_dir: PathBuf,
    pub tasks_file: String,
    pub inbox_file: String,
    pub fund_file: String,
    pub company_file: String,
    pub context_file: String,
    pub people_dir: String,
    pub glossary_file: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_dir: data_dir(),
            tasks_file: "TASKS.md".to_string(),
            inbox_file: "inbox.md".to_string(),
            fund_file: "memory/fund-ii.md".to_string(),
            company_file: "memory/company.md".to_string(),
            context_file: "memory/claude-context.md".to_string(),
            people_dir: "memory/people".to_string(),
            glossary_file: "memory/glossary.md".to_string(),
        }
    }
}

impl MemoryConfig {
    /// Configuration with the default file layout under another base directory
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            ..Default::default()
        }
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.base_dir.join(&self.tasks_file)
    }

    pub fn inbox_path(&self) -> PathBuf {
        self.base_dir.join(&self.inbox_file)
    }

    pub fn fund_path(&self) -> PathBuf {
        self.base_dir.join(&self.fund_file)
    }

    pub fn company_path(&self) -> PathBuf {
        self.base_dir.join(&self.company_file)
    }

    pub fn context_path(&self) -> PathBuf {
        self.base_dir.join(&self.context_file)
    }

    pub fn people_path(&self) -> PathBuf {
        self.base_dir.join(&self.people_dir)
    }

    pub fn glossary_path(&self) -> PathBuf {
        self.base_dir.join(&self.glossary_file)
    }
}

/// Get the memory configuration
pub fn memory_config() -> MemoryConfig {
    MemoryConfig::default()
}

const STARTER_TASKS: &str = "## Work — Operations\n\n## Done\n";
const STARTER_INBOX: &str = "# Inbox\n";

/// Initialize the data workspace directories and starter files.
/// This should be called at startup before any request handling begins.
/// Existing files are never touched, so live data survives restarts.
pub fn initialize_workspace() -> std::io::Result<()> {
    let data = data_dir();
    std::fs::create_dir_all(&data)?;
    std::fs::create_dir_all(memory_dir())?;
    std::fs::create_dir_all(people_dir())?;
    std::fs::create_dir_all(meeting_summaries_dir())?;
    std::fs::create_dir_all(meeting_archive_dir())?;

    let tasks = tasks_path();
    if !tasks.exists() {
        log::info!("Seeding starter task file at {:?}", tasks);
        std::fs::write(&tasks, STARTER_TASKS)?;
    }

    let inbox = inbox_path();
    if !inbox.exists() {
        log::info!("Seeding starter inbox file at {:?}", inbox);
        std::fs::write(&inbox, STARTER_INBOX)?;
    }

    Ok(())
}
