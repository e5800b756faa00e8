//! Device-flow authentication against the Microsoft identity platform
//!
//! Tokens live in a small JSON cache file. Normal runs read the cache and
//! refresh silently when the access token is near expiry; the one-time
//! interactive setup runs the device flow and seeds the cache.

use super::GRAPH_BASE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const SCOPES: [&str; 4] = [
    "https://graph.microsoft.com/Calendars.Read",
    "https://graph.microsoft.com/Mail.Read",
    "https://graph.microsoft.com/User.Read",
    "https://graph.microsoft.com/Tasks.Read",
];

/// Seconds of validity an access token must still have to be used as-is
const EXPIRY_SKEW_SECS: i64 = 60;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

fn scope_string() -> String {
    // offline_access yields the refresh token
    format!("{} offline_access", SCOPES.join(" "))
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenCache {
    access_token: String,
    refresh_token: String,
    /// Unix seconds at which the access token expires
    expires_at: i64,
}

impl TokenCache {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_SKEW_SECS > now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// In-progress device flow returned by [`GraphAuth::begin_device_flow`]
#[derive(Debug, Deserialize)]
pub struct DeviceFlow {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Human-readable sign-in instructions from the identity platform
    pub message: String,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: Option<u64>,
}

/// Signed-in account details from the `/me` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

pub struct GraphAuth {
    client: Client,
    client_id: String,
    tenant_id: String,
    cache_path: PathBuf,
}

impl GraphAuth {
    pub fn new(client_id: String, tenant_id: String, cache_path: PathBuf) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            client_id,
            tenant_id,
            cache_path,
        }
    }

    fn token_endpoint(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.tenant_id
        )
    }

    fn devicecode_endpoint(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/devicecode",
            self.tenant_id
        )
    }

    fn load_cache(&self) -> Option<TokenCache> {
        let raw = std::fs::read_to_string(&self.cache_path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn save_cache(&self, cache: &TokenCache) -> Result<(), String> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create token cache dir: {}", e))?;
        }
        let raw = serde_json::to_string_pretty(cache)
            .map_err(|e| format!("Failed to serialize token cache: {}", e))?;
        std::fs::write(&self.cache_path, raw)
            .map_err(|e| format!("Failed to write token cache: {}", e))
    }

    fn store_token_response(
        &self,
        token: TokenResponse,
        old_refresh: Option<String>,
    ) -> Result<String, String> {
        let refresh_token = token.refresh_token.or(old_refresh).unwrap_or_default();
        let cache = TokenCache {
            access_token: token.access_token.clone(),
            refresh_token,
            expires_at: chrono::Utc::now().timestamp() + token.expires_in,
        };
        self.save_cache(&cache)?;
        Ok(token.access_token)
    }

    /// Get a valid access token, refreshing silently when the cached one is
    /// near expiry. Fails when no cache exists; run the setup binary once.
    pub async fn get_access_token(&self) -> Result<String, String> {
        let cache = self
            .load_cache()
            .ok_or("No cached token. Run: cargo run --bin graph_setup")?;

        if cache.is_fresh(chrono::Utc::now().timestamp()) {
            return Ok(cache.access_token);
        }

        self.refresh(cache.refresh_token).await
    }

    async fn refresh(&self, refresh_token: String) -> Result<String, String> {
        let scope = scope_string();
        let response = self
            .client
            .post(self.token_endpoint())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", scope.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| format!("Failed to refresh token: {}", e))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(format!("Token refresh failed: {}", error));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse token response: {}", e))?;

        log::info!("[GRAPH] Access token refreshed");
        self.store_token_response(token, Some(refresh_token))
    }

    /// Start the interactive device flow. The returned flow carries the
    /// user-facing sign-in message; print it, then poll with
    /// [`GraphAuth::wait_for_device_token`].
    pub async fn begin_device_flow(&self) -> Result<DeviceFlow, String> {
        let scope = scope_string();
        let response = self
            .client
            .post(self.devicecode_endpoint())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| format!("Device code request failed: {}", e))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(format!("Device code request failed: {}", error));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse device code response: {}", e))
    }

    /// Poll the token endpoint until the user completes sign-in, then cache
    /// and return the access token.
    pub async fn wait_for_device_token(&self, flow: &DeviceFlow) -> Result<String, String> {
        let mut interval = flow.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let deadline = std::time::Instant::now() + Duration::from_secs(flow.expires_in);

        loop {
            if std::time::Instant::now() >= deadline {
                return Err("Device flow expired before sign-in completed".to_string());
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;

            let response = self
                .client
                .post(self.token_endpoint())
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("device_code", flow.device_code.as_str()),
                    ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                ])
                .send()
                .await
                .map_err(|e| format!("Device token request failed: {}", e))?;

            if response.status().is_success() {
                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| format!("Failed to parse token response: {}", e))?;
                return self.store_token_response(token, None);
            }

            let error_text = response.text().await.unwrap_or_default();
            match serde_json::from_str::<TokenErrorResponse>(&error_text) {
                Ok(err) if err.error == "authorization_pending" => continue,
                Ok(err) if err.error == "slow_down" => {
                    interval += 5;
                    continue;
                }
                Ok(err) => {
                    return Err(format!(
                        "Device flow failed: {}",
                        err.error_description.unwrap_or(err.error)
                    ));
                }
                Err(_) => return Err(format!("Device flow failed: {}", error_text)),
            }
        }
    }

    /// Fetch the signed-in account's profile. Used by setup to surface the
    /// user id that belongs in the environment.
    pub async fn me(&self, access_token: &str) -> Result<UserProfile, String> {
        let response = self
            .client
            .get(format!("{}/me", GRAPH_BASE))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| format!("Profile request failed: {}", e))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(format!("Profile request failed: {}", error));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse profile response: {}", e))
    }
}
