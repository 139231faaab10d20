use crate::utils::config::Config;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InferenceArgument {
    pub detect_mode: DetectMode,
    pub classes: Vec<u32>,
    pub conf: f32,
    pub imgsz: u32,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DetectMode {
    Predict,
    Track,
}

impl Display for DetectMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectMode::Predict => write!(f, "predict"),
            DetectMode::Track => write!(f, "track"),
        }
    }
}

impl InferenceArgument {
    pub fn new(detect_mode: DetectMode, config: &Config) -> Self {
        Self {
            detect_mode,
            classes: config.target_classes.clone(),
            conf: config.detection_confidence,
            imgsz: config.inference_image_size,
        }
    }
}
