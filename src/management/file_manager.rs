use crate::utils::logging::*;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use uuid::Uuid;

pub const TEMP_INPUT_FOLDER: &str = "temp_input";
pub const TRACKING_OUTPUT_FOLDER: &str = "temp_output/tracking";
pub const RESULT_FOLDER: &str = "results";

pub struct FileManager;

impl FileManager {
    pub async fn initialize() {
        logging_information!(SystemEntry::Initializing);
        let folders = [TEMP_INPUT_FOLDER, TRACKING_OUTPUT_FOLDER, RESULT_FOLDER];
        for &folder_name in &folders {
            let path = PathBuf::from(folder_name);
            if let Err(err) = fs::create_dir_all(&path).await {
                logging_critical!(IOEntry::CreateDirectoryError(path.display(), err));
            }
        }
        logging_information!(SystemEntry::InitializeComplete);
    }

    /// Removes per-request working input. Result files and tracking artifacts
    /// stay on disk; there is no retention policy for them.
    pub async fn cleanup() {
        logging_information!(SystemEntry::Cleaning);
        let path = PathBuf::from(TEMP_INPUT_FOLDER);
        if let Err(err) = fs::remove_dir_all(&path).await {
            logging_error!(IOEntry::DeleteDirectoryError(path.display(), err));
        }
        logging_information!(SystemEntry::CleanComplete);
    }

    /// Writes the working copy the collaborator will read, keyed by the
    /// request id so concurrent requests never share a path.
    pub async fn save_working_image(image: &RgbImage, request_id: Uuid) -> Result<PathBuf, LogEntry> {
        let path = Path::new(TEMP_INPUT_FOLDER).join(format!("{request_id}.jpg"));
        let mut bytes = Vec::new();
        JpegEncoder::new(&mut bytes)
            .encode_image(image)
            .map_err(|err| error_entry!(format!("Failed to encode working image: {err}")))?;
        fs::write(&path, bytes)
            .await
            .map_err(|err| error_entry!(IOEntry::WriteFileError(path.display(), err)))?;
        Ok(path)
    }

    pub fn upload_path(request_id: Uuid, file_name: &str) -> PathBuf {
        Path::new(TEMP_INPUT_FOLDER).join(format!("{request_id}_{file_name}"))
    }

    pub fn tracking_output_folder(request_id: Uuid) -> PathBuf {
        Path::new(TRACKING_OUTPUT_FOLDER).join(request_id.to_string())
    }

    pub async fn remove_file(path: &Path) {
        if let Err(err) = fs::remove_file(path).await {
            logging_warning!(IOEntry::DeleteFileError(path.display(), err));
        }
    }

    /// Most recently modified file in `folder`, None when the folder holds no
    /// files at all.
    pub async fn newest_file(folder: &Path) -> Result<Option<PathBuf>, LogEntry> {
        let mut dir_entries = fs::read_dir(folder)
            .await
            .map_err(|err| error_entry!(IOEntry::ReadDirectoryError(folder.display(), err)))?;
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        while let Some(entry) = dir_entries
            .next_entry()
            .await
            .map_err(|err| error_entry!(IOEntry::ReadDirectoryError(folder.display(), err)))?
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|metadata| metadata.modified()) {
                Ok(modified) => modified,
                Err(_) => SystemTime::UNIX_EPOCH,
            };
            match &newest {
                Some((time, _)) if *time >= modified => {}
                _ => newest = Some((modified, path)),
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}
