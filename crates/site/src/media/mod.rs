//! Image processing: avatar compositing and upload preparation.
//!
//! Everything here is synchronous and CPU-bound. Async callers run it on the
//! blocking pool via `tokio::task::spawn_blocking`.

pub mod compositor;
pub mod uploads;

use folio_core::CropError;
use thiserror::Error;

pub use compositor::{AVATAR_JPEG_QUALITY, composite};
pub use uploads::{PreparedUpload, UPLOAD_JPEG_QUALITY, prepare_upload};

/// Errors from image processing.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The input bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The image metadata cannot produce a crop.
    #[error("invalid image metadata: {0}")]
    Crop(#[from] CropError),

    /// Encoding the output failed.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}
