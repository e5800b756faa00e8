use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use arec_backend::ai::ClaudeClient;
use arec_backend::assistant::Assistant;
use arec_backend::config::{self, Config};
use arec_backend::controllers;
use arec_backend::slack::SlackClient;
use arec_backend::store::{MeetingStore, MemoryReader, TaskStore};
use arec_backend::AppState;

fn build_assistant(
    config: &Config,
    tasks: &Arc<TaskStore>,
    reader: &Arc<MemoryReader>,
) -> Option<Arc<Assistant>> {
    let api_key = config.anthropic_api_key.as_deref()?;
    let bot_token = config.slack_bot_token.as_deref()?;

    match ClaudeClient::new(api_key, &config.claude_model) {
        Ok(claude) => {
            let slack = SlackClient::new(bot_token.to_string());
            Some(Arc::new(Assistant::new(
                claude,
                slack,
                Arc::clone(tasks),
                Arc::clone(reader),
                config::history_path(),
            )))
        }
        Err(e) => {
            log::error!("[ASSISTANT] Claude client init failed: {}", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("arec-backend v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing workspace");
    if let Err(e) = config::initialize_workspace() {
        log::error!("Failed to initialize workspace: {}", e);
    }

    let tasks = Arc::new(TaskStore::new(
        config::tasks_path(),
        config::inbox_path(),
        config::memory_dir(),
    ));
    let meetings = Arc::new(MeetingStore::new(
        config::meeting_summaries_dir(),
        config::meeting_archive_dir(),
    ));
    let reader = Arc::new(MemoryReader::new(config::memory_config()));

    let assistant = build_assistant(&config, &tasks, &reader);
    if assistant.is_none() {
        log::warn!(
            "[ASSISTANT] Slack assistant disabled; set ANTHROPIC_API_KEY and SLACK_BOT_TOKEN to enable"
        );
    }

    log::info!("Starting server on 0.0.0.0:{}", port);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                config: config.clone(),
                tasks: Arc::clone(&tasks),
                meetings: Arc::clone(&meetings),
                reader: Arc::clone(&reader),
                assistant: assistant.clone(),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::tasks::config)
            .configure(controllers::meetings::config)
            .configure(controllers::slack_events::config)
            .configure(controllers::dashboard::config)
    })
    .bind(("0.0.0.0", port))?
    .run();

    let server_handle = server.handle();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        log::info!("Received Ctrl+C, shutting down...");

        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop)
            .await
            .is_err()
        {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}
