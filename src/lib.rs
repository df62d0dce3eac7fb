use crate::config::config::Config;
use crate::error::{ApiError, ErrorResponse};
use crate::model::response::HealthResponse;
use crate::repository::database::Database;
use actix_web::{get, web, HttpResponse, Responder};

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod util;

/// Team logos travel as data URIs inside JSON bodies.
pub const JSON_BODY_LIMIT: usize = 50 * 1024 * 1024;

pub struct AppState {
    pub db: Database,
    pub config: Config,
}

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK",
        message: "League admin API is running",
    })
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Route not found".to_string(),
        message: None,
    })
}

/// Registers extractor settings and every route. The caller adds `AppState` and the
/// default service.
pub fn configure(conf: &mut web::ServiceConfig) {
    conf.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| ApiError::Validation(err.to_string()).into()),
    )
    .service(health_check)
    .configure(controller::auth::config)
    .configure(controller::teams::config)
    .configure(controller::scheduled_games::config);
}
