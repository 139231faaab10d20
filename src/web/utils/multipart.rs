use crate::management::utils::api_error::ApiError;
use crate::utils::logging::*;
use actix_multipart::{Field, Multipart};
use actix_web::HttpRequest;
use actix_web::http::header::CONTENT_LENGTH;
use futures::{StreamExt, TryStreamExt};
use sanitize_filename::sanitize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Slack for boundary markers and part headers when comparing the declared
/// request size against the file cap. The streamed cap is authoritative.
const MULTIPART_ENVELOPE_ALLOWANCE: usize = 64 * 1024;

pub struct UploadForm {
    pub file_name: String,
    pub data: Vec<u8>,
    pub confidence_threshold: Option<String>,
}

/// Rejects requests whose declared `Content-Length` cannot possibly contain a
/// file within the cap, before any of the body is read.
pub fn ensure_content_length(request: &HttpRequest, max_bytes: usize) -> Result<(), ApiError> {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if let Some(declared) = declared {
        if declared > max_bytes + MULTIPART_ENVELOPE_ALLOWANCE {
            return Err(ApiError::InvalidInput(format!(
                "File exceeds the maximum upload size of {max_bytes} bytes."
            )));
        }
    }
    Ok(())
}

/// Walks the multipart payload collecting the uploaded file plus the optional
/// `confidence_threshold` text field, whichever order they arrive in.
pub async fn read_upload_form(
    payload: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadForm, ApiError> {
    let mut file_name = None;
    let mut data = None;
    let mut confidence_threshold = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        let (field_name, upload_name) = describe_field(&field);
        if field_name.as_deref() == Some("confidence_threshold") {
            confidence_threshold = read_text_field(&mut field).await;
        } else if let Some(upload_name) = upload_name {
            let sanitized = sanitize(&upload_name);
            if sanitized.is_empty() {
                return Err(ApiError::InvalidInput(
                    MiscEntry::InvalidFileNameError.to_string(),
                ));
            }
            data = Some(read_field_bytes(&mut field, max_bytes).await?);
            file_name = Some(sanitized);
        }
    }
    match (file_name, data) {
        (Some(file_name), Some(data)) => Ok(UploadForm {
            file_name,
            data,
            confidence_threshold,
        }),
        _ => Err(ApiError::InvalidInput("Invalid payload.".to_string())),
    }
}

pub fn describe_field(field: &Field) -> (Option<String>, Option<String>) {
    match field.content_disposition() {
        Some(content_disposition) => (
            content_disposition.get_name().map(str::to_string),
            content_disposition.get_filename().map(str::to_string),
        ),
        None => (None, None),
    }
}

pub async fn read_field_bytes(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| {
            ApiError::InvalidInput(MiscEntry::UploadStreamError(err.to_string()).to_string())
        })?;
        if data.len() + chunk.len() > max_bytes {
            return Err(ApiError::InvalidInput(format!(
                "File exceeds the maximum upload size of {max_bytes} bytes."
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

pub async fn read_text_field(field: &mut Field) -> Option<String> {
    let data = field.next().await?.ok()?;
    Some(String::from_utf8_lossy(&data).trim().to_string())
}

pub async fn save_field_to_file(field: &mut Field, path: &Path) -> Result<(), LogEntry> {
    let mut file = File::create(path)
        .await
        .map_err(|err| error_entry!(IOEntry::CreateFileError(path.display(), err)))?;
    while let Some(chunk) = field.next().await {
        let data =
            chunk.map_err(|err| error_entry!(MiscEntry::UploadStreamError(err.to_string())))?;
        file.write_all(&data)
            .await
            .map_err(|err| error_entry!(IOEntry::WriteFileError(path.display(), err)))?;
    }
    Ok(())
}
