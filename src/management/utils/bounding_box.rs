use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// A detection exactly as the model collaborator reports it, with the box in
/// working-image coordinates.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

impl RawDetection {
    pub fn new(class_id: u32, confidence: f32, bbox: [f32; 4]) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }
}
