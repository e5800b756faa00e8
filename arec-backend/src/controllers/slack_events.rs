//! Slack Events API endpoint for the DM assistant.
//!
//! Slack retries any event that is not acknowledged quickly, so this
//! endpoint always answers `{"status": "ok"}` no matter what happened
//! while handling the message.

use actix_web::{web, HttpResponse, Responder};
use serde_json::Value;

use crate::AppState;

/// True for a plain user DM. Edits arrive with a subtype and bot posts
/// carry a bot_id; both are ignored so the assistant never replies to
/// its own messages.
fn is_plain_user_dm(event: &Value) -> bool {
    event.get("type").and_then(Value::as_str) == Some("message")
        && event.get("channel_type").and_then(Value::as_str) == Some("im")
        && matches!(event.get("subtype"), None | Some(Value::Null))
        && event.get("bot_id").is_none()
}

async fn slack_events(data: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    if body.get("type").and_then(Value::as_str) == Some("url_verification") {
        return HttpResponse::Ok().json(serde_json::json!({
            "challenge": body.get("challenge").cloned().unwrap_or(Value::Null)
        }));
    }

    if body.get("type").and_then(Value::as_str) == Some("event_callback") {
        if let Some(event) = body.get("event") {
            if is_plain_user_dm(event) {
                let text = event
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim();
                let channel = event.get("channel").and_then(Value::as_str).unwrap_or("");

                if !text.is_empty() && !channel.is_empty() {
                    match &data.assistant {
                        Some(assistant) => assistant.handle_dm(channel, text).await,
                        None => log::warn!(
                            "[ASSISTANT] DM received but the assistant is not configured"
                        ),
                    }
                }
            }
        }
    }

    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/slack/events").route(web::post().to(slack_events)));
}
