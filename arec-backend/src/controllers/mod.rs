//! HTTP controllers for the dashboard page, mutation APIs, and Slack events.

use actix_web::HttpResponse;
use serde::Serialize;

use crate::store::StoreError;

pub mod dashboard;
pub mod health;
pub mod meetings;
pub mod slack_events;
pub mod tasks;

/// Mutation response body shared by the task and meeting endpoints.
///
/// The dashboard page checks `data.ok` and surfaces `data.error` in an alert,
/// so `error` is omitted entirely on success.
#[derive(Debug, Serialize)]
pub struct OpResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpResponse {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Map a store error onto the status code the dashboard expects.
pub fn store_error_response(err: StoreError) -> HttpResponse {
    let body = OpResponse::failure(err.to_string());
    match err {
        StoreError::Invalid(_) => HttpResponse::BadRequest().json(body),
        StoreError::NotFound(_) => HttpResponse::NotFound().json(body),
        StoreError::Io(_) => HttpResponse::InternalServerError().json(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_error_field() {
        let body = serde_json::to_string(&OpResponse::success()).unwrap();
        assert_eq!(body, r#"{"ok":true}"#);
    }

    #[test]
    fn failure_carries_error_message() {
        let body = serde_json::to_string(&OpResponse::failure("Task not found")).unwrap();
        assert_eq!(body, r#"{"ok":false,"error":"Task not found"}"#);
    }

    #[test]
    fn store_errors_map_to_expected_statuses() {
        use actix_web::http::StatusCode;

        let resp = store_error_response(StoreError::NotFound("Task not found".to_string()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = store_error_response(StoreError::Invalid("Invalid priority".to_string()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = store_error_response(StoreError::Io(std::io::Error::other("disk gone")));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
