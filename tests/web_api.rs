use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use carwatch::management::file_manager::FileManager;
use carwatch::management::inference_gateway::InferenceGateway;
use carwatch::management::model::{DetectionModel, ModelError};
use carwatch::management::server::{AppState, Server};
use carwatch::management::utils::bounding_box::RawDetection;
use carwatch::management::utils::inference_argument::InferenceArgument;
use carwatch::utils::config::Config;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::path::Path;
use std::sync::Arc;

const BOUNDARY: &str = "carwatch-test-boundary";
const VIDEO_BYTES: &[u8] = b"annotated-video-bytes";

macro_rules! build_app {
    ($state:expr) => {{
        FileManager::initialize().await;
        test::init_service(App::new().app_data($state).configure(Server::routes)).await
    }};
}

struct FixedModel {
    detections: Vec<RawDetection>,
}

impl DetectionModel for FixedModel {
    fn predict(
        &self,
        _image_path: &Path,
        _argument: &InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError> {
        Ok(self.detections.clone())
    }

    fn track(
        &self,
        _source_path: &Path,
        output_folder: &Path,
        _argument: &InferenceArgument,
    ) -> Result<(), ModelError> {
        std::fs::create_dir_all(output_folder)
            .map_err(|err| ModelError::InvalidOutput(err.to_string()))?;
        std::fs::write(output_folder.join("tracked.mp4"), VIDEO_BYTES)
            .map_err(|err| ModelError::InvalidOutput(err.to_string()))?;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

struct FailingModel;

impl DetectionModel for FailingModel {
    fn predict(
        &self,
        _image_path: &Path,
        _argument: &InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError> {
        Err(ModelError::Process(1, "weights are corrupted".to_string()))
    }

    fn track(
        &self,
        _source_path: &Path,
        _output_folder: &Path,
        _argument: &InferenceArgument,
    ) -> Result<(), ModelError> {
        Err(ModelError::Process(1, "tracker crashed".to_string()))
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

/// Tracks but never writes an artifact.
struct SilentTracker;

impl DetectionModel for SilentTracker {
    fn predict(
        &self,
        _image_path: &Path,
        _argument: &InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError> {
        Ok(Vec::new())
    }

    fn track(
        &self,
        _source_path: &Path,
        _output_folder: &Path,
        _argument: &InferenceArgument,
    ) -> Result<(), ModelError> {
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

/// Reports the working file's byte size in the box, so each response can be
/// matched back to the request that produced it.
struct SizeSensitiveModel;

impl DetectionModel for SizeSensitiveModel {
    fn predict(
        &self,
        image_path: &Path,
        _argument: &InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError> {
        let size = std::fs::metadata(image_path)
            .map_err(|err| ModelError::InvalidOutput(err.to_string()))?
            .len() as f32;
        Ok(vec![RawDetection::new(2, 0.9, [0.0, 0.0, size, size])])
    }

    fn track(
        &self,
        _source_path: &Path,
        _output_folder: &Path,
        _argument: &InferenceArgument,
    ) -> Result<(), ModelError> {
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

fn state_with(model: Arc<dyn DetectionModel>, config: Config) -> web::Data<AppState> {
    let workers = config.inference_workers;
    web::Data::new(AppState::new(config, InferenceGateway::new(model, workers)))
}

fn fixed_state(detections: Vec<RawDetection>, config: Config) -> web::Data<AppState> {
    state_with(Arc::new(FixedModel { detections }), config)
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([40, 90, 160]));
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .expect("encode test image");
    bytes
}

fn file_part(body: &mut Vec<u8>, name: &str, filename: &str, bytes: &[u8]) {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}

fn text_part(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

fn finish_multipart(body: &mut Vec<u8>) {
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
}

fn multipart_request(uri: &str, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn image_upload(uri: &str, filename: &str, bytes: &[u8]) -> test::TestRequest {
    let mut body = Vec::new();
    file_part(&mut body, "file", filename, bytes);
    finish_multipart(&mut body);
    multipart_request(uri, body)
}

fn default_detections() -> Vec<RawDetection> {
    vec![RawDetection::new(2, 0.876_54, [10.0, 20.0, 40.0, 60.0])]
}

#[actix_web::test]
async fn health_reports_model_state() {
    let app = build_app!(fixed_state(Vec::new(), Config::default()));
    let response =
        test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert!(body["timestamp"].as_i64().unwrap_or_default() > 0);
}

#[actix_web::test]
async fn detect_returns_detections_in_original_coordinates() {
    let app = build_app!(fixed_state(default_detections(), Config::default()));
    let request = image_upload("/detect/image", "street.png", &png_bytes(64, 64));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["filename"], "street.png");
    assert_eq!(body["car_count"], 1);
    assert_eq!(body["image_width"], 64);
    assert_eq!(body["image_height"], 64);
    assert_eq!(body["detections"][0]["class_id"], 2);
    assert_eq!(body["detections"][0]["class_name"], "car");
    assert!((body["detections"][0]["confidence"].as_f64().unwrap() - 0.8765).abs() < 1e-6);
    assert_eq!(body["detections"][0]["bbox"]["x1"], 10.0);
    assert_eq!(body["detections"][0]["bbox"]["y2"], 60.0);
    assert!(body["timestamp"].as_i64().unwrap_or_default() > 0);
}

#[actix_web::test]
async fn detect_zero_detections_is_not_an_error() {
    let app = build_app!(fixed_state(Vec::new(), Config::default()));
    let request = image_upload("/detect/image", "empty.png", &png_bytes(32, 32));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["car_count"], 0);
    assert_eq!(body["detections"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn detect_rejects_non_image_blob() {
    let app = build_app!(fixed_state(default_detections(), Config::default()));
    let request = image_upload("/detect/image", "payload.png", b"this is not an image");
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .map(|detail| detail.contains("Invalid image"))
            .unwrap_or(false)
    );
}

#[actix_web::test]
async fn detect_size_limit_boundary() {
    let bytes = png_bytes(48, 48);
    let mut config = Config::default();
    config.max_file_size = bytes.len();
    let app = build_app!(fixed_state(Vec::new(), config));
    let request = image_upload("/detect/image", "exact.png", &bytes);
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut config = Config::default();
    config.max_file_size = bytes.len() - 1;
    let app = build_app!(fixed_state(Vec::new(), config));
    let request = image_upload("/detect/image", "over.png", &bytes);
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .map(|detail| detail.contains("maximum upload size"))
            .unwrap_or(false)
    );
}

#[actix_web::test]
async fn detect_rescales_boxes_for_downsized_uploads() {
    // 200x100 upload with the working copy capped at 64 pixels: the stub
    // reports a box spanning the whole working image, so the response must
    // span the whole original.
    let mut config = Config::default();
    config.max_image_dimension = 64;
    let detections = vec![RawDetection::new(2, 0.9, [0.0, 0.0, 64.0, 32.0])];
    let app = build_app!(fixed_state(detections, config));
    let request = image_upload("/detect/image", "wide.png", &png_bytes(200, 100));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["image_width"], 200);
    assert_eq!(body["image_height"], 100);
    let x2 = body["detections"][0]["bbox"]["x2"].as_f64().unwrap();
    let y2 = body["detections"][0]["bbox"]["y2"].as_f64().unwrap();
    assert!((x2 - 200.0).abs() <= 2.0);
    assert!((y2 - 100.0).abs() <= 2.0);
}

#[actix_web::test]
async fn detect_is_idempotent_for_identical_uploads() {
    let app = build_app!(fixed_state(default_detections(), Config::default()));
    let bytes = png_bytes(64, 64);
    let first = image_upload("/detect/image", "same.png", &bytes);
    let first = test::call_service(&app, first.to_request()).await;
    let second = image_upload("/detect/image", "same.png", &bytes);
    let second = test::call_service(&app, second.to_request()).await;
    let first: serde_json::Value = test::read_body_json(first).await;
    let second: serde_json::Value = test::read_body_json(second).await;
    assert_eq!(first["detections"], second["detections"]);
    assert_eq!(first["car_count"], second["car_count"]);
}

#[actix_web::test]
async fn detect_inference_failure_is_internal_error() {
    let app = build_app!(state_with(Arc::new(FailingModel), Config::default()));
    let request = image_upload("/detect/image", "street.png", &png_bytes(32, 32));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(response).await;
    let detail = body["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("Inference error"));
    assert!(detail.contains("weights are corrupted"));
}

#[actix_web::test]
async fn concurrent_detects_keep_their_own_results() {
    let app = build_app!(state_with(Arc::new(SizeSensitiveModel), Config::default()));
    let small = image_upload("/detect/image", "small.png", &png_bytes(16, 16));
    let large = image_upload("/detect/image", "large.png", &png_bytes(64, 64));
    let (small_response, large_response) = futures::join!(
        test::call_service(&app, small.to_request()),
        test::call_service(&app, large.to_request()),
    );
    let small_body: serde_json::Value = test::read_body_json(small_response).await;
    let large_body: serde_json::Value = test::read_body_json(large_response).await;
    assert_eq!(small_body["image_width"], 16);
    assert_eq!(large_body["image_width"], 64);
    let small_marker = small_body["detections"][0]["bbox"]["x2"].as_f64().unwrap();
    let large_marker = large_body["detections"][0]["bbox"]["x2"].as_f64().unwrap();
    assert!(small_marker < large_marker);
}

#[actix_web::test]
async fn verify_decision_follows_threshold() {
    let app = build_app!(fixed_state(default_detections(), Config::default()));

    let mut body = Vec::new();
    file_part(&mut body, "file", "car.png", &png_bytes(32, 32));
    text_part(&mut body, "confidence_threshold", "0.2");
    finish_multipart(&mut body);
    let request = multipart_request("/verify/car", body);
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let approved: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(approved["is_car"], true);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["detections_count"], 1);
    assert!(
        approved["message"]
            .as_str()
            .map(|message| message.contains("APPROVED"))
            .unwrap_or(false)
    );

    let mut body = Vec::new();
    file_part(&mut body, "file", "car.png", &png_bytes(32, 32));
    text_part(&mut body, "confidence_threshold", "0.95");
    finish_multipart(&mut body);
    let request = multipart_request("/verify/car", body);
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let failed: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(failed["is_car"], true);
    assert_eq!(failed["status"], "failed");
}

#[actix_web::test]
async fn verify_defaults_threshold_when_field_is_missing() {
    let app = build_app!(fixed_state(default_detections(), Config::default()));
    let request = image_upload("/verify/car", "car.png", &png_bytes(32, 32));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["confidence_threshold"], 0.5);
    assert_eq!(body["status"], "approved");
}

#[actix_web::test]
async fn verify_rejects_out_of_range_threshold() {
    let app = build_app!(fixed_state(default_detections(), Config::default()));
    let mut body = Vec::new();
    file_part(&mut body, "file", "car.png", &png_bytes(32, 32));
    text_part(&mut body, "confidence_threshold", "1.5");
    finish_multipart(&mut body);
    let request = multipart_request("/verify/car", body);
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body["detail"],
        "confidence_threshold must be between 0.0 and 1.0"
    );
}

#[actix_web::test]
async fn verify_reports_no_car_for_empty_detections() {
    let app = build_app!(fixed_state(Vec::new(), Config::default()));
    let request = image_upload("/verify/car", "empty.png", &png_bytes(32, 32));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["is_car"], false);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["message"], "No car detected in the image.");
}

#[actix_web::test]
async fn track_rejects_unsupported_extension_before_writing() {
    let app = build_app!(fixed_state(Vec::new(), Config::default()));
    let request = image_upload("/track/video", "notes.txt", b"plain text payload");
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["detail"], "Unsupported video format.");
    let mut entries = tokio::fs::read_dir("temp_input").await.expect("temp_input");
    while let Some(entry) = entries.next_entry().await.expect("read temp_input") {
        let name = entry.file_name();
        assert!(
            !name.to_string_lossy().ends_with("notes.txt"),
            "rejected upload must not be written to disk"
        );
    }
}

#[actix_web::test]
async fn track_streams_the_generated_artifact() {
    let app = build_app!(fixed_state(Vec::new(), Config::default()));
    let request = image_upload("/track/video", "drive.mp4", b"raw video upload");
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(content_type, "video/mp4");
    let body = test::read_body(response).await;
    assert_eq!(body.as_ref(), VIDEO_BYTES);
}

#[actix_web::test]
async fn track_missing_output_is_internal_error() {
    let app = build_app!(state_with(Arc::new(SilentTracker), Config::default()));
    let request = image_upload("/track/video", "drive.mp4", b"raw video upload");
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["detail"], "Tracking folder missing.");
}

#[actix_web::test]
async fn track_collaborator_failure_is_internal_error() {
    let app = build_app!(state_with(Arc::new(FailingModel), Config::default()));
    let request = image_upload("/track/video", "drive.mp4", b"raw video upload");
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .map(|detail| detail.contains("tracker crashed"))
            .unwrap_or(false)
    );
}

#[actix_web::test]
async fn frontend_and_unknown_assets() {
    let app = build_app!(fixed_state(Vec::new(), Config::default()));
    let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response =
        test::call_service(&app, test::TestRequest::get().uri("/style.css").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response =
        test::call_service(&app, test::TestRequest::get().uri("/missing.js").to_request()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
