//! Interactive device-flow sign-in for Microsoft Graph.
//!
//! Prints the verification code, waits for the browser sign-in to finish,
//! saves the token cache, then shows the MS_USER_ID line to put in .env.

use dotenv::dotenv;

use arec_backend::config::{self, env_vars};
use arec_backend::graph::GraphAuth;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let client_id = std::env::var(env_vars::AZURE_CLIENT_ID).unwrap_or_default();
    let tenant_id = std::env::var(env_vars::AZURE_TENANT_ID).unwrap_or_default();

    if client_id.is_empty() || tenant_id.is_empty() {
        eprintln!("AZURE_CLIENT_ID and AZURE_TENANT_ID must be set");
        std::process::exit(1);
    }

    let auth = GraphAuth::new(client_id, tenant_id, config::token_cache_path());

    let flow = match auth.begin_device_flow().await {
        Ok(flow) => flow,
        Err(e) => {
            eprintln!("✗ Failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{}", "=".repeat(60));
    println!("MICROSOFT AUTHENTICATION");
    println!("{}", "=".repeat(60));
    println!("\n{}\n", flow.message);

    let access_token = match auth.wait_for_device_token(&flow).await {
        Ok(token) => token,
        Err(e) => {
            eprintln!("✗ Failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Authentication successful.");

    match auth.me(&access_token).await {
        Ok(profile) => {
            println!(
                "✓ Signed in as: {} ({})",
                profile.display_name.as_deref().unwrap_or("unknown"),
                profile.mail.as_deref().unwrap_or("no mail")
            );
            if let Some(id) = profile.id {
                println!("\nAdd to your .env:");
                println!("MS_USER_ID={}", id);
            }
        }
        Err(e) => {
            eprintln!("✗ Profile lookup failed: {}", e);
            std::process::exit(1);
        }
    }
}
