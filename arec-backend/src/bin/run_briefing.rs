//! One-shot morning briefing, meant to run from cron.

use dotenv::dotenv;

use arec_backend::briefing::run_briefing;
use arec_backend::config::Config;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    if let Err(e) = run_briefing(&config).await {
        log::error!("[BRIEFING] Briefing failed: {}", e);
        std::process::exit(1);
    }
}
