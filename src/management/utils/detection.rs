use crate::management::utils::bounding_box::{BoundingBox, RawDetection};
use serde::{Deserialize, Serialize};

const CAR_CLASS_NAME: &str = "car";

fn round_confidence(confidence: f32) -> f32 {
    (confidence * 10_000.0).round() / 10_000.0
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Detection {
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Maps a raw detection back to original-image space. `scale_x`/`scale_y`
    /// are original-over-working ratios (1.0 when the upload was not resized);
    /// the box is clamped to the original bounds.
    pub fn from_raw(raw: &RawDetection, scale_x: f32, scale_y: f32, width: u32, height: u32) -> Self {
        let [x1, y1, x2, y2] = raw.bbox;
        let bbox = BoundingBox {
            x1: (x1 * scale_x).clamp(0.0, width as f32),
            y1: (y1 * scale_y).clamp(0.0, height as f32),
            x2: (x2 * scale_x).clamp(0.0, width as f32),
            y2: (y2 * scale_y).clamp(0.0, height as f32),
        };
        Self {
            class_id: raw.class_id,
            class_name: CAR_CLASS_NAME.to_string(),
            confidence: round_confidence(raw.confidence),
            bbox,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DetectionResult {
    pub filename: String,
    pub timestamp: i64,
    pub car_count: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub detections: Vec<Detection>,
    pub processing_time_seconds: f64,
}

impl DetectionResult {
    pub fn new(
        filename: String,
        timestamp: i64,
        width: u32,
        height: u32,
        detections: Vec<Detection>,
        processing_time_seconds: f64,
    ) -> Self {
        Self {
            filename,
            timestamp,
            car_count: detections.len(),
            image_width: width,
            image_height: height,
            detections,
            processing_time_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(confidence: f32, bbox: [f32; 4]) -> RawDetection {
        RawDetection::new(2, confidence, bbox)
    }

    #[test]
    fn identity_scale_keeps_coordinates() {
        let detection = Detection::from_raw(&raw(0.9, [10.0, 20.0, 110.0, 220.0]), 1.0, 1.0, 640, 480);
        assert_eq!(detection.bbox, BoundingBox { x1: 10.0, y1: 20.0, x2: 110.0, y2: 220.0 });
        assert_eq!(detection.class_name, "car");
    }

    #[test]
    fn rescale_round_trips_within_tolerance() {
        // 1920x1080 original downsized to 1280x720, ground truth box on the
        // original resolution image.
        let scale_x = 1920.0 / 1280.0;
        let scale_y = 1080.0 / 720.0;
        let working = [200.0, 100.0, 600.0, 400.0];
        let detection = Detection::from_raw(&raw(0.8, working), scale_x, scale_y, 1920, 1080);
        let expected = [300.0, 150.0, 900.0, 600.0];
        assert!((detection.bbox.x1 - expected[0]).abs() <= 2.0);
        assert!((detection.bbox.y1 - expected[1]).abs() <= 2.0);
        assert!((detection.bbox.x2 - expected[2]).abs() <= 2.0);
        assert!((detection.bbox.y2 - expected[3]).abs() <= 2.0);
    }

    #[test]
    fn rescaled_boxes_stay_within_original_bounds() {
        let detection = Detection::from_raw(&raw(0.7, [-5.0, -5.0, 1300.0, 730.0]), 1.5, 1.5, 1920, 1080);
        assert!(detection.bbox.x1 >= 0.0 && detection.bbox.x2 <= 1920.0);
        assert!(detection.bbox.y1 >= 0.0 && detection.bbox.y2 <= 1080.0);
    }

    #[test]
    fn confidence_rounds_to_four_decimals() {
        let detection = Detection::from_raw(&raw(0.123_456, [0.0, 0.0, 1.0, 1.0]), 1.0, 1.0, 10, 10);
        assert_eq!(detection.confidence, 0.1235);
    }

    #[test]
    fn car_count_matches_detections() {
        let detections = vec![
            Detection::from_raw(&raw(0.9, [0.0, 0.0, 1.0, 1.0]), 1.0, 1.0, 10, 10),
            Detection::from_raw(&raw(0.8, [2.0, 2.0, 3.0, 3.0]), 1.0, 1.0, 10, 10),
        ];
        let result = DetectionResult::new("cars.jpg".to_string(), 0, 10, 10, detections, 0.1);
        assert_eq!(result.car_count, result.detections.len());
    }
}
