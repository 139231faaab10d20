use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Request-path failure taxonomy. Every variant renders as a JSON body with a
/// `detail` message carrying the underlying cause.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Unsupported video format.")]
    UnsupportedFormat,
    #[error("Inference error: {0}")]
    Inference(String),
    #[error("Tracking error: {0}")]
    Tracking(String),
    #[error("{0}")]
    MissingOutput(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::UnsupportedFormat => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) | ApiError::Tracking(_) | ApiError::MissingOutput(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
