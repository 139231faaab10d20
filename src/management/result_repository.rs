use crate::management::file_manager::RESULT_FOLDER;
use crate::management::utils::detection::DetectionResult;
use crate::utils::logging::*;
use sanitize_filename::sanitize;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub struct ResultRepository;

impl ResultRepository {
    /// Persists a detection result as JSON, keyed by the upload's base name
    /// and the request id. Callers treat failure as non-fatal.
    pub async fn save_detection(
        result: &DetectionResult,
        request_id: Uuid,
    ) -> Result<PathBuf, LogEntry> {
        let base_filename = Path::new(&result.filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(sanitize)
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let path = Path::new(RESULT_FOLDER).join(format!("{base_filename}_{request_id}.json"));
        let json = serde_json::to_string_pretty(result)
            .map_err(|err| error_entry!(IOEntry::SerdeSerializeError(err)))?;
        fs::write(&path, json)
            .await
            .map_err(|err| error_entry!(IOEntry::WriteFileError(path.display(), err)))?;
        Ok(path)
    }
}
