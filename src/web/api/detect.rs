use crate::management::file_manager::FileManager;
use crate::management::image_normalizer;
use crate::management::result_repository::ResultRepository;
use crate::management::server::AppState;
use crate::management::utils::api_error::ApiError;
use crate::management::utils::detection::{Detection, DetectionResult};
use crate::management::utils::inference_argument::{DetectMode, InferenceArgument};
use crate::utils::logging::*;
use crate::web::utils::multipart::{ensure_content_length, read_upload_form};
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Scope, post, web};
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;

pub fn initialize() -> Scope {
    web::scope("/detect").service(image)
}

#[post("/image")]
async fn image(
    request: HttpRequest,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let timestamp = Utc::now().timestamp();
    let request_id = Uuid::new_v4();
    ensure_content_length(&request, state.config.max_file_size)?;
    let upload = read_upload_form(&mut payload, state.config.max_file_size).await?;
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
    let detections = raw_detections
        .iter()
        .map(|raw| {
            Detection::from_raw(
                raw,
                normalized.scale_x(),
                normalized.scale_y(),
                normalized.original_width,
                normalized.original_height,
            )
        })
        .collect::<Vec<Detection>>();
    let result = DetectionResult::new(
        upload.file_name,
        timestamp,
        normalized.original_width,
        normalized.original_height,
        detections,
        started.elapsed().as_secs_f64(),
    );
    match ResultRepository::save_detection(&result, request_id).await {
        Ok(path) => {
            logging_information!(format!(
                "Saved detection result to {path}",
                path = path.display()
            ))
        }
        Err(entry) => logging_entry!(entry),
    }
    Ok(HttpResponse::Ok().json(result))
}
