use image::RgbImage;
use image::imageops::FilterType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("File exceeds the maximum upload size of {0} bytes.")]
    TooLarge(usize),
    #[error("Invalid image. Error: {0}")]
    Decode(image::ImageError),
}

/// RGB working copy of an upload. `original_width`/`original_height` are the
/// dimensions before any downsizing, so detections on the working copy can be
/// mapped back to the upload's coordinate space.
pub struct NormalizedImage {
    pub image: RgbImage,
    pub original_width: u32,
    pub original_height: u32,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn was_resized(&self) -> bool {
        self.original_width != self.width() || self.original_height != self.height()
    }

    pub fn scale_x(&self) -> f32 {
        self.original_width as f32 / self.width() as f32
    }

    pub fn scale_y(&self) -> f32 {
        self.original_height as f32 / self.height() as f32
    }
}

/// Pure transform: no disk access. Oversized uploads are rejected, everything
/// else is decoded, converted to RGB and downsized so the longer side is at
/// most `max_dimension`.
pub fn normalize(
    bytes: &[u8],
    max_bytes: usize,
    max_dimension: u32,
) -> Result<NormalizedImage, NormalizeError> {
    if bytes.len() > max_bytes {
        return Err(NormalizeError::TooLarge(max_bytes));
    }
    let decoded = image::load_from_memory(bytes).map_err(NormalizeError::Decode)?;
    let original_width = decoded.width();
    let original_height = decoded.height();
    let image = if original_width.max(original_height) > max_dimension {
        decoded
            .resize(max_dimension, max_dimension, FilterType::Lanczos3)
            .to_rgb8()
    } else {
        decoded.to_rgb8()
    };
    Ok(NormalizedImage {
        image,
        original_width,
        original_height,
    })
}
