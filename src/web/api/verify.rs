use crate::management::file_manager::FileManager;
use crate::management::image_normalizer;
use crate::management::server::AppState;
use crate::management::utils::api_error::ApiError;
use crate::management::utils::inference_argument::{DetectMode, InferenceArgument};
use crate::management::utils::verification::VerificationResult;
use crate::utils::logging::*;
use crate::web::utils::multipart::{ensure_content_length, read_upload_form};
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Scope, post, web};
use std::time::Instant;
use uuid::Uuid;

const THRESHOLD_RANGE_MESSAGE: &str = "confidence_threshold must be between 0.0 and 1.0";

pub fn initialize() -> Scope {
    web::scope("/verify").service(car)
}

#[post("/car")]
async fn car(
    request: HttpRequest,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();
    ensure_content_length(&request, state.config.max_file_size)?;
    let upload = read_upload_form(&mut payload, state.config.max_file_size).await?;
    let confidence_threshold = match &upload.confidence_threshold {
        Some(raw) => raw
            .parse::<f32>()
            .map_err(|_| ApiError::InvalidInput(THRESHOLD_RANGE_MESSAGE.to_string()))?,
        None => state.config.verification_threshold,
    };
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(ApiError::InvalidInput(THRESHOLD_RANGE_MESSAGE.to_string()));
    }
    let normalized = image_normalizer::normalize(
        &upload.data,
        state.config.max_file_size,
        state.config.max_image_dimension,
    )
    .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    let working_path = match FileManager::save_working_image(&normalized.image, request_id).await {
        Ok(path) => path,
        Err(entry) => {
            let message = entry.message.clone();
            logging_entry!(entry);
            return Err(ApiError::Inference(message));
        }
    };
    let argument = InferenceArgument::new(DetectMode::Predict, &state.config);
    let prediction = state.gateway.predict(working_path.clone(), argument).await;
    FileManager::remove_file(&working_path).await;
    let raw_detections = match prediction {
        Ok(raw_detections) => raw_detections,
        Err(err) => {
            let message = err.to_string();
            logging_error!(message.clone());
            return Err(ApiError::Inference(message));
        }
    };
    let result = VerificationResult::evaluate(
        &raw_detections,
        confidence_threshold,
        started.elapsed().as_secs_f64(),
    );
    Ok(HttpResponse::Ok().json(result))
}
