use crate::management::utils::bounding_box::RawDetection;
use serde::{Deserialize, Serialize};

const STATUS_APPROVED: &str = "approved";
const STATUS_FAILED: &str = "failed";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VerificationResult {
    pub is_car: bool,
    pub status: String,
    pub confidence: f32,
    pub detections_count: usize,
    pub confidence_threshold: f32,
    pub processing_time_seconds: f64,
    pub message: String,
}

impl VerificationResult {
    /// Approval requires at least one detection whose confidence reaches the
    /// caller-supplied threshold.
    pub fn evaluate(
        detections: &[RawDetection],
        confidence_threshold: f32,
        processing_time_seconds: f64,
    ) -> Self {
        let max_confidence = detections
            .iter()
            .map(|detection| detection.confidence)
            .fold(0.0_f32, f32::max);
        let is_car = !detections.is_empty();
        let approved = is_car && max_confidence >= confidence_threshold;
        let message = if is_car {
            format!(
                "Car detected with {:.1}% confidence. Status: {} (threshold: {:.0}%)",
                max_confidence * 100.0,
                if approved { "APPROVED" } else { "FAILED" },
                confidence_threshold * 100.0,
            )
        } else {
            "No car detected in the image.".to_string()
        };
        Self {
            is_car,
            status: if approved { STATUS_APPROVED } else { STATUS_FAILED }.to_string(),
            confidence: if is_car {
                (max_confidence * 10_000.0).round() / 10_000.0
            } else {
                0.0
            },
            detections_count: detections.len(),
            confidence_threshold,
            processing_time_seconds,
            message,
        }
    }

    pub fn approved(&self) -> bool {
        self.status == STATUS_APPROVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detections(confidences: &[f32]) -> Vec<RawDetection> {
        confidences
            .iter()
            .map(|&confidence| RawDetection::new(2, confidence, [0.0, 0.0, 10.0, 10.0]))
            .collect()
    }

    #[test]
    fn no_detections_fails_with_zero_confidence() {
        let result = VerificationResult::evaluate(&[], 0.5, 0.01);
        assert!(!result.is_car);
        assert!(!result.approved());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.detections_count, 0);
        assert_eq!(result.message, "No car detected in the image.");
    }

    #[test]
    fn approves_when_max_confidence_reaches_threshold() {
        let result = VerificationResult::evaluate(&detections(&[0.3, 0.8]), 0.5, 0.01);
        assert!(result.is_car);
        assert!(result.approved());
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.detections_count, 2);
        assert!(result.message.contains("APPROVED"));
    }

    #[test]
    fn raising_threshold_is_monotonic() {
        let set = detections(&[0.4, 0.7]);
        let mut previously_approved = true;
        for threshold in [0.0, 0.2, 0.5, 0.7, 0.9, 1.0] {
            let approved = VerificationResult::evaluate(&set, threshold, 0.0).approved();
            assert!(previously_approved || !approved);
            previously_approved = approved;
        }
    }

    #[test]
    fn zero_threshold_approves_any_detection() {
        let result = VerificationResult::evaluate(&detections(&[0.01]), 0.0, 0.0);
        assert!(result.approved());
    }

    #[test]
    fn full_threshold_requires_perfect_confidence() {
        assert!(!VerificationResult::evaluate(&detections(&[0.99]), 1.0, 0.0).approved());
        assert!(VerificationResult::evaluate(&detections(&[1.0]), 1.0, 0.0).approved());
    }
}
