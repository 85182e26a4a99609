//! Square avatar compositing.
//!
//! Produces what the editor preview shows with `object-fit: cover` and
//! `object-position: x% y%`, scaled by the stored zoom.

use folio_core::{AvatarTransform, CropPlan};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::MediaError;

/// JPEG quality of composited avatars.
pub const AVATAR_JPEG_QUALITY: u8 = 90;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Composite `source` into a `size` x `size` JPEG.
///
/// # Errors
///
/// Returns `MediaError::Decode` if `source` is not an image,
/// `MediaError::Crop` if its dimensions are unusable, and
/// `MediaError::Encode` if JPEG encoding fails.
pub fn composite(
    source: &[u8],
    size: u32,
    transform: &AvatarTransform,
) -> Result<Vec<u8>, MediaError> {
    let image = image::load_from_memory(source).map_err(MediaError::Decode)?;
    let plan = CropPlan::plan(image.width(), image.height(), size, transform)?;
    let extract = plan.extract();

    debug!(
        source_width = image.width(),
        source_height = image.height(),
        ?plan,
        ?extract,
        "Compositing avatar"
    );

    let region = image
        .crop_imm(extract.x, extract.y, extract.width, extract.height)
        .to_rgba8();
    let resized = imageops::resize(
        &region,
        extract.scaled_width,
        extract.scaled_height,
        FilterType::Lanczos3,
    );

    // Positive draw offsets letterbox, negative ones crop. The white canvas
    // also flattens transparency, which JPEG cannot carry.
    let mut canvas = RgbaImage::from_pixel(size, size, BACKGROUND);
    imageops::overlay(&mut canvas, &resized, extract.draw_x, extract.draw_y);

    let rgb = image::DynamicImage::ImageRgba8(canvas).to_rgb8();

    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, AVATAR_JPEG_QUALITY))
        .map_err(MediaError::Encode)?;

    Ok(out)
}
