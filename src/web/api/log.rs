use crate::utils::logging::Logger;
use actix_web::{HttpResponse, Responder, Scope, get, web};
use chrono::{DateTime, Local};

pub fn initialize() -> Scope {
    web::scope("/log")
        .service(system_log)
        .service(system_log_since)
}

#[get("/system")]
async fn system_log() -> impl Responder {
    let system_log = Logger::get_system_logs()
        .await
        .into_iter()
        .map(|log| log.to_plain_string())
        .collect::<Vec<String>>();
    HttpResponse::Ok().json(system_log)
}

#[get("/system/since/{since}")]
async fn system_log_since(since: web::Path<String>) -> impl Responder {
    match parse_datetime(&since.into_inner()) {
        Ok(since_time) => {
            let logs = Logger::get_system_logs_since(since_time)
                .await
                .into_iter()
                .map(|log| log.to_plain_string())
                .collect::<Vec<String>>();
            HttpResponse::Ok().json(logs)
        }
        Err(_) => HttpResponse::BadRequest().body("Invalid datetime format."),
    }
}

fn parse_datetime(datetime_str: &str) -> Result<DateTime<Local>, String> {
    DateTime::parse_from_rfc3339(datetime_str)
        .map_err(|_| "Invalid datetime format".to_string())
        .map(|dt| dt.with_timezone(&Local))
}
