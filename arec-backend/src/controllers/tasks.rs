//! Task mutation endpoints backing the dashboard page.
//!
//! Complete, add, and reprioritize all resolve the task by its exact
//! checkbox text, which the page carries in a `data-task-text` attribute.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::config::defaults;
use crate::controllers::{store_error_response, OpResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
struct CompleteTaskRequest {
    task_text: Option<String>,
}

async fn complete_task(
    data: web::Data<AppState>,
    body: web::Json<CompleteTaskRequest>,
) -> impl Responder {
    let task_text = body.task_text.as_deref().unwrap_or("").trim();

    if task_text.is_empty() {
        return HttpResponse::BadRequest().json(OpResponse::failure("No task text provided"));
    }

    match data.tasks.complete(task_text) {
        Ok(()) => HttpResponse::Ok().json(OpResponse::success()),
        Err(e) => store_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct AddTaskRequest {
    task_text: Option<String>,
    priority: Option<String>,
    section: Option<String>,
}

async fn add_task(data: web::Data<AppState>, body: web::Json<AddTaskRequest>) -> impl Responder {
    let task_text = body.task_text.as_deref().unwrap_or("").trim();
    let priority = body.priority.as_deref().unwrap_or("Med").trim();
    let section = body
        .section
        .as_deref()
        .unwrap_or(defaults::DEFAULT_TASK_SECTION)
        .trim();

    if task_text.is_empty() {
        return HttpResponse::BadRequest().json(OpResponse::failure("No task text provided"));
    }

    match data.tasks.add(task_text, priority, section) {
        Ok(()) => HttpResponse::Ok().json(OpResponse::success()),
        Err(e) => store_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ChangePriorityRequest {
    task_text: Option<String>,
    priority: Option<String>,
}

async fn change_priority(
    data: web::Data<AppState>,
    body: web::Json<ChangePriorityRequest>,
) -> impl Responder {
    let task_text = body.task_text.as_deref().unwrap_or("").trim();
    let priority = body.priority.as_deref().unwrap_or("").trim();

    if task_text.is_empty() || priority.is_empty() {
        return HttpResponse::BadRequest()
            .json(OpResponse::failure("Missing task_text or priority"));
    }

    match data.tasks.reprioritize(task_text, priority) {
        Ok(()) => HttpResponse::Ok().json(OpResponse::success()),
        Err(e) => store_error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/task")
            .route("/complete", web::post().to(complete_task))
            .route("/add", web::post().to(add_task))
            .route("/priority", web::post().to(change_priority)),
    );
}
