//! Shared HTTP client
//!
//! One pooled reqwest client for every outbound call (Graph, Anthropic,
//! Slack). `Client::clone()` is an `Arc` increment; callers add auth
//! headers per request.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(120))
        .build()
        .expect("Failed to create shared HTTP client")
});

/// Get a reference to the shared HTTP client
pub fn shared_client() -> &'static Client {
    &SHARED_CLIENT
}
