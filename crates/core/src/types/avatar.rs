//! Avatar pan/zoom state and the cover-crop geometry derived from it.
//!
//! The stored transform is user input from an editor, so it is normalized
//! leniently: anything missing, non-numeric or out of range falls back to
//! the default or is clamped, never rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default crop center on each axis, in percent.
pub const DEFAULT_POSITION: f64 = 50.0;
/// Default zoom, in percent.
pub const DEFAULT_ZOOM: f64 = 100.0;
/// Smallest accepted zoom, in percent.
pub const MIN_ZOOM: f64 = 50.0;
/// Largest accepted zoom, in percent.
pub const MAX_ZOOM: f64 = 200.0;

/// Errors from crop planning.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    /// The source image reported a zero width or height.
    #[error("invalid image metadata: source is {width}x{height}")]
    InvalidSourceDimensions { width: u32, height: u32 },

    /// The requested output edge is zero.
    #[error("output size must be greater than zero")]
    InvalidOutputSize,
}

/// Crop center in percent of the overflow on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: DEFAULT_POSITION,
            y: DEFAULT_POSITION,
        }
    }
}

/// Normalized avatar transform: position in `[0, 100]`, zoom in `[50, 200]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAvatarTransform")]
pub struct AvatarTransform {
    position: Position,
    zoom: f64,
}

impl Default for AvatarTransform {
    fn default() -> Self {
        Self {
            position: Position::default(),
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl AvatarTransform {
    /// Build a transform from numeric input, clamping into range.
    ///
    /// Non-finite values fall back to the defaults.
    #[must_use]
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self {
            position: Position {
                x: clamp_or(x, 0.0, 100.0, DEFAULT_POSITION),
                y: clamp_or(y, 0.0, 100.0, DEFAULT_POSITION),
            },
            zoom: clamp_or(zoom, MIN_ZOOM, MAX_ZOOM, DEFAULT_ZOOM),
        }
    }

    /// Build a transform from stored JSON, as kept in the profile row.
    ///
    /// `position` is expected to look like `{"x": 40, "y": "60"}`; numbers
    /// and numeric strings are accepted, anything else becomes the default.
    #[must_use]
    pub fn from_stored(position: Option<&Value>, zoom: Option<&Value>) -> Self {
        let axis = |key: &str| {
            position
                .and_then(|p| p.get(key))
                .and_then(lenient_number)
                .unwrap_or(DEFAULT_POSITION)
        };
        let zoom = zoom.and_then(lenient_number).unwrap_or(DEFAULT_ZOOM);

        Self::new(axis("x"), axis("y"), zoom)
    }

    /// Crop center.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Zoom in percent.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }
}

/// Wire shape accepted by `Deserialize`, before normalization.
#[derive(Deserialize, Default)]
struct RawAvatarTransform {
    #[serde(default)]
    position: Option<Value>,
    #[serde(default)]
    zoom: Option<Value>,
}

impl From<RawAvatarTransform> for AvatarTransform {
    fn from(raw: RawAvatarTransform) -> Self {
        Self::from_stored(raw.position.as_ref(), raw.zoom.as_ref())
    }
}

/// Read a number from JSON, accepting numeric strings.
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Cover-fit geometry for a square avatar.
///
/// Conceptually the source is resized to `scaled_width` x `scaled_height`
/// and the output square is taken at (`left`, `top`) in that resized image.
/// Offsets are negative only when zoom is below 100% and the resized image
/// is smaller than the output on that axis; the image is then placed inside
/// the square at (`-left`, `-top`).
///
/// The resized image is never materialized. [`CropPlan::extract`] maps the
/// visible window back to source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    pub size: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub scale: f64,
    pub scaled_width: u64,
    pub scaled_height: u64,
    pub left: i64,
    pub top: i64,
}

/// The part of the source that is visible in the output, and where it lands.
///
/// Crop `x, y, width, height` from the source, resize that region to
/// `scaled_width` x `scaled_height` and draw it on the output square at
/// (`draw_x`, `draw_y`). The resized region never exceeds the output edge by
/// more than two source pixels' worth of scale on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extract {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub draw_x: i64,
    pub draw_y: i64,
}

impl CropPlan {
    /// Plan the crop for a `width` x `height` source and an output square of
    /// edge `size`.
    ///
    /// # Errors
    ///
    /// Returns `CropError::InvalidSourceDimensions` if either source
    /// dimension is zero and `CropError::InvalidOutputSize` if `size` is zero.
    pub fn plan(
        width: u32,
        height: u32,
        size: u32,
        transform: &AvatarTransform,
    ) -> Result<Self, CropError> {
        if width == 0 || height == 0 {
            return Err(CropError::InvalidSourceDimensions { width, height });
        }
        if size == 0 {
            return Err(CropError::InvalidOutputSize);
        }

        let target = f64::from(size);
        let base_scale = f64::max(target / f64::from(width), target / f64::from(height));
        let scale = base_scale * transform.zoom / 100.0;

        let scaled_width = scale_dimension(width, scale);
        let scaled_height = scale_dimension(height, scale);

        let position = transform.position;
        let left = offset(scaled_width, size, position.x);
        let top = offset(scaled_height, size, position.y);

        Ok(Self {
            size,
            source_width: width,
            source_height: height,
            scale,
            scaled_width,
            scaled_height,
            left,
            top,
        })
    }

    /// Source region covering the visible window.
    #[must_use]
    pub fn extract(&self) -> Extract {
        let x = extract_axis(
            self.source_width,
            self.scaled_width,
            self.left,
            self.size,
            self.scale,
        );
        let y = extract_axis(
            self.source_height,
            self.scaled_height,
            self.top,
            self.size,
            self.scale,
        );

        Extract {
            x: x.start,
            y: y.start,
            width: x.len,
            height: y.len,
            scaled_width: x.scaled_len,
            scaled_height: y.scaled_len,
            draw_x: x.draw,
            draw_y: y.draw,
        }
    }
}

// Saturating cast; decodable images stay far below u64::MAX
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_dimension(dimension: u32, factor: f64) -> u64 {
    ((f64::from(dimension) * factor).round() as u64).max(1)
}

/// Offset of the output square along one axis, clamped into the valid range.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn offset(scaled: u64, size: u32, percent: f64) -> i64 {
    let overflow = i64::try_from(scaled).unwrap_or(i64::MAX) - i64::from(size);
    let raw = ((overflow as f64) * (percent / 100.0)).round() as i64;

    raw.clamp(overflow.min(0), overflow.max(0))
}

struct AxisExtract {
    start: u32,
    len: u32,
    scaled_len: u32,
    draw: i64,
}

/// Map the visible window `[offset, offset + size)` of one scaled axis back
/// to whole source pixels.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn extract_axis(source: u32, scaled: u64, offset: i64, size: u32, scale: f64) -> AxisExtract {
    let scaled = i64::try_from(scaled).unwrap_or(i64::MAX);
    let visible_start = offset.max(0);
    let visible_end = (offset + i64::from(size)).min(scaled);

    let start = ((visible_start as f64 / scale).floor() as u32).min(source - 1);
    let end = ((visible_end as f64 / scale).ceil() as u32).clamp(start + 1, source);

    let scaled_start = (f64::from(start) * scale).round() as i64;
    let scaled_end = ((f64::from(end) * scale).round() as i64).min(scaled);

    AxisExtract {
        start,
        len: end - start,
        scaled_len: (scaled_end - scaled_start).max(1) as u32,
        draw: scaled_start - offset,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn transform(x: f64, y: f64, zoom: f64) -> AvatarTransform {
        AvatarTransform::new(x, y, zoom)
    }

    #[test]
    fn test_defaults_are_centered_at_full_zoom() {
        let t = AvatarTransform::default();
        assert!((t.position().x - 50.0).abs() < f64::EPSILON);
        assert!((t.position().y - 50.0).abs() < f64::EPSILON);
        assert!((t.zoom() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_clamps_out_of_range() {
        let t = transform(150.0, -20.0, 10.0);
        assert!((t.position().x - 100.0).abs() < f64::EPSILON);
        assert!(t.position().y.abs() < f64::EPSILON);
        assert!((t.zoom() - MIN_ZOOM).abs() < f64::EPSILON);

        let t = transform(50.0, 50.0, 900.0);
        assert!((t.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_non_finite_falls_back() {
        let t = transform(f64::NAN, f64::INFINITY, f64::NAN);
        assert_eq!(t, AvatarTransform::default());
    }

    #[test]
    fn test_from_stored_accepts_numeric_strings() {
        let position = json!({"x": "25", "y": 75});
        let zoom = json!("150");
        let t = AvatarTransform::from_stored(Some(&position), Some(&zoom));
        assert_eq!(t, transform(25.0, 75.0, 150.0));
    }

    #[test]
    fn test_from_stored_malformed_normalizes_to_default() {
        let position = json!({"x": "left", "y": null});
        let zoom = json!({"value": 3});
        let t = AvatarTransform::from_stored(Some(&position), Some(&zoom));
        assert_eq!(t, AvatarTransform::default());

        let t = AvatarTransform::from_stored(Some(&json!("center")), None);
        assert_eq!(t, AvatarTransform::default());

        assert_eq!(
            AvatarTransform::from_stored(None, None),
            AvatarTransform::default()
        );
    }

    #[test]
    fn test_deserialize_is_lenient() {
        let t: AvatarTransform =
            serde_json::from_str(r#"{"position": {"x": 500, "y": "abc"}, "zoom": 75}"#).unwrap();
        assert_eq!(t, transform(100.0, 50.0, 75.0));

        let t: AvatarTransform = serde_json::from_str("{}").unwrap();
        assert_eq!(t, AvatarTransform::default());
    }

    #[test]
    fn test_plan_rejects_zero_dimensions() {
        let t = AvatarTransform::default();
        assert_eq!(
            CropPlan::plan(0, 600, 512, &t),
            Err(CropError::InvalidSourceDimensions {
                width: 0,
                height: 600
            })
        );
        assert_eq!(
            CropPlan::plan(1000, 600, 0, &t),
            Err(CropError::InvalidOutputSize)
        );
    }

    #[test]
    fn test_plan_landscape_top_left() {
        let plan = CropPlan::plan(1000, 600, 512, &transform(0.0, 0.0, 100.0)).unwrap();
        assert_eq!(plan.scaled_width, 853);
        assert_eq!(plan.scaled_height, 512);
        assert_eq!(plan.left, 0);
        assert_eq!(plan.top, 0);
    }

    #[test]
    fn test_plan_centered_matches_object_fit_cover() {
        let sources = [(1000, 600), (600, 1000), (512, 512), (4032, 3024), (300, 200)];
        for (width, height) in sources {
            let plan = CropPlan::plan(width, height, 512, &AvatarTransform::default()).unwrap();
            let expected_left = i64::try_from((plan.scaled_width - 512).div_ceil(2)).unwrap();
            let expected_top = i64::try_from((plan.scaled_height - 512).div_ceil(2)).unwrap();
            assert_eq!(plan.left, expected_left, "{width}x{height}");
            assert_eq!(plan.top, expected_top, "{width}x{height}");
            // Cover at zoom 100 always fills one axis exactly.
            assert!(plan.scaled_width == 512 || plan.scaled_height == 512);
        }
    }

    #[test]
    fn test_plan_right_edge() {
        let plan = CropPlan::plan(1000, 600, 512, &transform(100.0, 100.0, 100.0)).unwrap();
        assert_eq!(plan.left, 341);
        assert_eq!(plan.top, 0);
    }

    #[test]
    fn test_plan_offsets_stay_in_bounds() {
        let sources = [(1000, 600), (600, 1000), (513, 511), (1, 1), (7, 3000)];
        let steps = [0.0, 12.5, 33.3, 50.0, 66.6, 99.9, 100.0];
        for (width, height) in sources {
            for &x in &steps {
                for &y in &steps {
                    for zoom in [100.0, 137.0, 200.0] {
                        let plan =
                            CropPlan::plan(width, height, 512, &transform(x, y, zoom)).unwrap();
                        let max_left = i64::try_from(plan.scaled_width).unwrap() - 512;
                        let max_top = i64::try_from(plan.scaled_height).unwrap() - 512;
                        assert!((0..=max_left).contains(&plan.left), "{plan:?}");
                        assert!((0..=max_top).contains(&plan.top), "{plan:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_plan_zoom_narrows_field() {
        let at_100 = CropPlan::plan(1000, 600, 512, &transform(30.0, 70.0, 100.0)).unwrap();
        let at_150 = CropPlan::plan(1000, 600, 512, &transform(30.0, 70.0, 150.0)).unwrap();
        assert!(at_150.scaled_width > at_100.scaled_width);
        assert!(at_150.scaled_height > at_100.scaled_height);
        assert_eq!(at_150.scaled_height, 768);
        assert_eq!(at_150.scaled_width, 1280);
    }

    #[test]
    fn test_plan_zoom_out_letterboxes() {
        let plan = CropPlan::plan(1000, 1000, 512, &transform(50.0, 50.0, 50.0)).unwrap();
        assert_eq!(plan.scaled_width, 256);
        assert_eq!(plan.scaled_height, 256);
        assert_eq!(plan.left, -128);
        assert_eq!(plan.top, -128);

        let plan = CropPlan::plan(1000, 1000, 512, &transform(0.0, 100.0, 50.0)).unwrap();
        assert_eq!(plan.left, 0);
        assert_eq!(plan.top, -256);
    }

    #[test]
    fn test_extract_whole_image_when_letterboxed() {
        let plan = CropPlan::plan(1000, 1000, 512, &transform(50.0, 50.0, 50.0)).unwrap();
        assert_eq!(
            plan.extract(),
            Extract {
                x: 0,
                y: 0,
                width: 1000,
                height: 1000,
                scaled_width: 256,
                scaled_height: 256,
                draw_x: 128,
                draw_y: 128,
            }
        );
    }

    #[test]
    fn test_extract_exact_at_unit_scale() {
        let plan = CropPlan::plan(1024, 512, 512, &transform(100.0, 0.0, 100.0)).unwrap();
        let extract = plan.extract();
        assert_eq!((extract.x, extract.y), (512, 0));
        assert_eq!((extract.width, extract.height), (512, 512));
        assert_eq!((extract.scaled_width, extract.scaled_height), (512, 512));
        assert_eq!((extract.draw_x, extract.draw_y), (0, 0));
    }

    #[test]
    fn test_extract_thin_source_stays_small() {
        let plan = CropPlan::plan(1, 1024, 512, &transform(50.0, 50.0, 200.0)).unwrap();
        assert_eq!(plan.scaled_height, 1_048_576);

        let extract = plan.extract();
        assert_eq!((extract.x, extract.width), (0, 1));
        assert_eq!((extract.y, extract.height), (511, 2));
        assert!(extract.scaled_width <= 1024);
        assert!(extract.scaled_height <= 2048);
    }

    #[test]
    fn test_extract_covers_output_square() {
        let sources = [(1000, 600), (600, 1000), (513, 511), (1, 1), (7, 3000), (4032, 3024)];
        let steps = [0.0, 33.3, 50.0, 99.9, 100.0];
        for (width, height) in sources {
            for &x in &steps {
                for zoom in [50.0, 100.0, 137.0, 200.0] {
                    let plan =
                        CropPlan::plan(width, height, 512, &transform(x, 100.0 - x, zoom)).unwrap();
                    let e = plan.extract();

                    assert!(e.x + e.width <= width && e.y + e.height <= height, "{plan:?}");

                    // Wherever the scaled image reaches, the drawn region reaches too
                    let visible_w = (plan.left + 512).min(i64::try_from(plan.scaled_width).unwrap());
                    let visible_h = (plan.top + 512).min(i64::try_from(plan.scaled_height).unwrap());
                    assert!(e.draw_x <= (-plan.left).max(0), "{plan:?} {e:?}");
                    assert!(e.draw_y <= (-plan.top).max(0), "{plan:?} {e:?}");
                    assert!(
                        e.draw_x + i64::from(e.scaled_width) >= visible_w - plan.left,
                        "{plan:?} {e:?}"
                    );
                    assert!(
                        e.draw_y + i64::from(e.scaled_height) >= visible_h - plan.top,
                        "{plan:?} {e:?}"
                    );
                }
            }
        }
    }
}
