//! Captured video frames.

use image::GenericImageView;
use time::OffsetDateTime;

/// One frame captured from the camera.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// When the frame was captured (UTC).
    pub captured_at: OffsetDateTime,
    /// Decoded pixel data.
    pub image: image::DynamicImage,
}

impl Frame {
    /// Creates a frame captured now.
    #[must_use]
    pub fn new(image: image::DynamicImage) -> Self {
        Self::captured_at(image, OffsetDateTime::now_utc())
    }

    /// Creates a frame with an explicit capture time.
    #[must_use]
    pub fn captured_at(image: image::DynamicImage, captured_at: OffsetDateTime) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            captured_at,
            image,
        }
    }
}
