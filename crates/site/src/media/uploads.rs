//! Preparing uploaded images for storage.

use std::io::Cursor;

use folio_core::{ImageEncoding, ImagePurpose};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use super::MediaError;

/// JPEG quality of stored photos.
pub const UPLOAD_JPEG_QUALITY: u8 = 85;

/// An image re-encoded and ready to store.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Downsize and re-encode an uploaded image for `purpose`.
///
/// The longest edge is capped at the purpose's limit; smaller images keep
/// their size. Photos become JPEG, favicons PNG.
///
/// # Errors
///
/// Returns `MediaError::Decode` if `bytes` is not an image and
/// `MediaError::Encode` if re-encoding fails.
pub fn prepare_upload(purpose: ImagePurpose, bytes: &[u8]) -> Result<PreparedUpload, MediaError> {
    let image = image::load_from_memory(bytes).map_err(MediaError::Decode)?;

    let max_edge = purpose.max_edge();
    let image = if image.width() > max_edge || image.height() > max_edge {
        debug!(
            width = image.width(),
            height = image.height(),
            max_edge,
            "Downsizing upload"
        );
        image.resize(max_edge, max_edge, FilterType::Lanczos3)
    } else {
        image
    };

    let encoding = purpose.encoding();
    let bytes = match encoding {
        ImageEncoding::Jpeg => encode_jpeg(&image)?,
        ImageEncoding::Png => {
            let mut out = Cursor::new(Vec::new());
            image
                .write_to(&mut out, ImageFormat::Png)
                .map_err(MediaError::Encode)?;
            out.into_inner()
        }
    };

    Ok(PreparedUpload {
        bytes,
        width: image.width(),
        height: image.height(),
        content_type: encoding.content_type(),
        extension: encoding.extension(),
    })
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, MediaError> {
    let mut flattened = RgbaImage::from_pixel(image.width(), image.height(), Rgba([255; 4]));
    imageops::overlay(&mut flattened, &image.to_rgba8(), 0, 0);
    let rgb = DynamicImage::ImageRgba8(flattened).to_rgb8();

    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, UPLOAD_JPEG_QUALITY))
        .map_err(MediaError::Encode)?;
    Ok(out)
}
