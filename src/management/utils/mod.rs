pub mod api_error;
pub mod bounding_box;
pub mod detection;
pub mod inference_argument;
pub mod verification;
