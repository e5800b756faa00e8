//! Meeting archive endpoint.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::controllers::{store_error_response, OpResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
struct ArchiveMeetingRequest {
    filename: Option<String>,
}

async fn archive_meeting(
    data: web::Data<AppState>,
    body: web::Json<ArchiveMeetingRequest>,
) -> impl Responder {
    let filename = body.filename.as_deref().unwrap_or("").trim();

    if filename.is_empty() {
        return HttpResponse::BadRequest().json(OpResponse::failure("No filename provided"));
    }

    match data.meetings.archive(filename) {
        Ok(()) => HttpResponse::Ok().json(OpResponse::success()),
        Err(e) => store_error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/meeting").route("/archive", web::post().to(archive_meeting)));
}
