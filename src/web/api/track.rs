use crate::management::file_manager::FileManager;
use crate::management::server::AppState;
use crate::management::utils::api_error::ApiError;
use crate::management::utils::inference_argument::{DetectMode, InferenceArgument};
use crate::utils::logging::*;
use crate::web::utils::multipart::{describe_field, save_field_to_file};
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Scope, post, web};
use futures::TryStreamExt;
use sanitize_filename::sanitize;
use std::ffi::OsStr;
use std::path::Path;
use uuid::Uuid;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

pub fn initialize() -> Scope {
    web::scope("/track").service(video)
}

#[post("/video")]
async fn video(
    request: HttpRequest,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let mut input_path = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        let (_, upload_name) = describe_field(&field);
        let Some(upload_name) = upload_name else {
            continue;
        };
        let sanitized = sanitize(&upload_name);
        let extension = Path::new(&sanitized)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase);
        let supported = matches!(extension.as_deref(), Some(extension) if VIDEO_EXTENSIONS.contains(&extension));
        if !supported {
            return Err(ApiError::UnsupportedFormat);
        }
        let path = FileManager::upload_path(request_id, &sanitized);
        if let Err(entry) = save_field_to_file(&mut field, &path).await {
            let message = entry.message.clone();
            logging_entry!(entry);
            return Err(ApiError::Tracking(message));
        }
        input_path = Some(path);
        break;
    }
    let Some(input_path) = input_path else {
        return Err(ApiError::InvalidInput("Invalid payload.".to_string()));
    };
    let output_folder = FileManager::tracking_output_folder(request_id);
    let argument = InferenceArgument::new(DetectMode::Track, &state.config);
    let tracking = state
        .gateway
        .track(input_path.clone(), output_folder.clone(), argument)
        .await;
    FileManager::remove_file(&input_path).await;
    if let Err(err) = tracking {
        let message = err.to_string();
        logging_error!(message.clone());
        return Err(ApiError::Tracking(message));
    }
    if !output_folder.exists() {
        return Err(ApiError::MissingOutput("Tracking folder missing.".to_string()));
    }
    let artifact = match FileManager::newest_file(&output_folder).await {
        Ok(Some(artifact)) => artifact,
        Ok(None) => {
            return Err(ApiError::MissingOutput("No output file generated.".to_string()));
        }
        Err(entry) => {
            let message = entry.message.clone();
            logging_entry!(entry);
            return Err(ApiError::Tracking(message));
        }
    };
    let artifact_name = artifact
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("tracking.mp4")
        .to_string();
    let named_file = NamedFile::open_async(&artifact)
        .await
        .map_err(|err| ApiError::Tracking(err.to_string()))?;
    let content_disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(artifact_name)],
    };
    Ok(named_file
        .set_content_type(mime_guess::from_path(&artifact).first_or_octet_stream())
        .set_content_disposition(content_disposition)
        .into_response(&request))
}
