use crate::management::utils::bounding_box::RawDetection;
use crate::management::utils::inference_argument::{DetectMode, InferenceArgument};
use crate::utils::config::Config;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to launch inference process: {0}")]
    Launch(std::io::Error),
    #[error("Inference process exited with code {0}: {1}")]
    Process(i32, String),
    #[error("Invalid inference output: {0}")]
    InvalidOutput(String),
    #[error("Inference task panicked: {0}")]
    Panicked(String),
    #[error("Inference pool is shut down")]
    PoolClosed,
}

/// The external detection/tracking collaborator. Implementations are blocking
/// and must be safe to call from several worker threads at once.
pub trait DetectionModel: Send + Sync {
    /// Runs detection on a single image and returns boxes in the coordinate
    /// space of that image.
    fn predict(
        &self,
        image_path: &Path,
        argument: &InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError>;

    /// Runs tracking over a video with track persistence enabled, writing the
    /// annotated result into `output_folder`.
    fn track(
        &self,
        source_path: &Path,
        output_folder: &Path,
        argument: &InferenceArgument,
    ) -> Result<(), ModelError>;

    fn is_loaded(&self) -> bool;
}

/// Drives the ultralytics worker scripts as child processes. `predict` parses
/// the JSON box list the script prints to stdout; `track` only has filesystem
/// side effects.
pub struct UltralyticsModel {
    python: String,
    script_folder: PathBuf,
    model_path: PathBuf,
}

impl UltralyticsModel {
    pub fn new(config: &Config) -> Self {
        Self {
            python: config.python_executable.clone(),
            script_folder: PathBuf::from(&config.script_folder),
            model_path: PathBuf::from(&config.model_path),
        }
    }

    fn script_for(&self, detect_mode: DetectMode) -> PathBuf {
        match detect_mode {
            DetectMode::Predict => self.script_folder.join("predict.py"),
            DetectMode::Track => self.script_folder.join("track.py"),
        }
    }

    fn class_filter(argument: &InferenceArgument) -> String {
        argument
            .classes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<String>>()
            .join(",")
    }

    fn run_script(&self, command: &mut Command) -> Result<Vec<u8>, ModelError> {
        let output = command.output().map_err(ModelError::Launch)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ModelError::Process(output.status.code().unwrap_or(-1), stderr));
        }
        Ok(output.stdout)
    }
}

impl DetectionModel for UltralyticsModel {
    fn predict(
        &self,
        image_path: &Path,
        argument: &InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError> {
        let stdout = self.run_script(
            Command::new(&self.python)
                .arg(self.script_for(argument.detect_mode))
                .arg(&self.model_path)
                .arg(image_path)
                .arg(argument.imgsz.to_string())
                .arg(argument.conf.to_string())
                .arg(Self::class_filter(argument)),
        )?;
        serde_json::from_slice::<Vec<RawDetection>>(&stdout)
            .map_err(|err| ModelError::InvalidOutput(err.to_string()))
    }

    fn track(
        &self,
        source_path: &Path,
        output_folder: &Path,
        argument: &InferenceArgument,
    ) -> Result<(), ModelError> {
        self.run_script(
            Command::new(&self.python)
                .arg(self.script_for(argument.detect_mode))
                .arg(&self.model_path)
                .arg(source_path)
                .arg(output_folder)
                .arg(argument.imgsz.to_string())
                .arg(argument.conf.to_string())
                .arg(Self::class_filter(argument)),
        )?;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.model_path.exists() && self.script_folder.exists()
    }
}
