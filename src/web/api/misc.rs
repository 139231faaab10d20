use crate::management::server::AppState;
use actix_web::{HttpResponse, Responder, Scope, get, web};
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    model_loaded: bool,
    timestamp: i64,
}

pub fn initialize() -> Scope {
    web::scope("/health").service(health)
}

#[get("")]
async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "healthy".to_string(),
        model_loaded: state.gateway.is_loaded(),
        timestamp: Utc::now().timestamp(),
    })
}
