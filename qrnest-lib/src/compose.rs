//! Image compositing for the layered QR output.
//!
//! A deterministic geometric/photometric pipeline with no randomness: the
//! secondary and tertiary symbols are shrunk, dimmed (the tertiary also
//! recolored toward red), and alpha-pasted onto the primary symbol at
//! fixed relative positions. All placement arithmetic is integer pixel
//! math with truncating division, exposed as pure functions of the
//! primary's dimensions so it unit-tests without constructing images.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

/// The secondary overlay is 1/5 of the primary per axis.
pub const SECONDARY_SHRINK: u32 = 5;

/// Brightness factor applied to the secondary overlay.
pub const SECONDARY_BRIGHTNESS: f32 = 0.4;

/// The tertiary overlay is 1/6 of the primary per axis.
pub const TERTIARY_SHRINK: u32 = 6;

/// Brightness factor applied to the recolored tertiary overlay.
pub const TERTIARY_BRIGHTNESS: f32 = 0.6;

/// Constant green/blue level of the recolored tertiary overlay.
pub const TERTIARY_CHANNEL_LEVEL: u8 = 50;

/// Margin, in pixels, between the tertiary overlay and the bottom-right
/// corner of the primary.
pub const TERTIARY_MARGIN: u32 = 20;

/// Overlay dimensions: the primary's, divided (truncating) per axis.
pub fn overlay_size((width, height): (u32, u32), shrink: u32) -> (u32, u32) {
    (width / shrink, height / shrink)
}

/// Top-left paste offset of the secondary overlay: a quarter of the
/// primary along each axis.
pub fn secondary_offset((width, height): (u32, u32)) -> (i64, i64) {
    (i64::from(width / 4), i64::from(height / 4))
}

/// Top-left paste offset of the tertiary overlay: anchored near the
/// bottom-right corner, [`TERTIARY_MARGIN`] pixels from each edge.
pub fn tertiary_offset((width, height): (u32, u32), (overlay_w, overlay_h): (u32, u32)) -> (i64, i64) {
    (
        i64::from(width) - i64::from(overlay_w) - i64::from(TERTIARY_MARGIN),
        i64::from(height) - i64::from(overlay_h) - i64::from(TERTIARY_MARGIN),
    )
}

/// Blend the secondary and tertiary symbols onto the primary.
///
/// Takes ownership of the primary buffer and mutates it in place; the
/// overlays are consumed only through resized copies.
pub fn compose(primary: RgbaImage, secondary: &RgbaImage, tertiary: &RgbaImage) -> RgbaImage {
    let mut canvas = primary;
    let dims = canvas.dimensions();

    let (sec_w, sec_h) = overlay_size(dims, SECONDARY_SHRINK);
    let mut secondary = imageops::resize(secondary, sec_w, sec_h, FilterType::Lanczos3);
    scale_brightness(&mut secondary, SECONDARY_BRIGHTNESS);
    let (sec_x, sec_y) = secondary_offset(dims);
    imageops::overlay(&mut canvas, &secondary, sec_x, sec_y);
    debug!(sec_w, sec_h, sec_x, sec_y, "pasted secondary overlay");

    let (ter_w, ter_h) = overlay_size(dims, TERTIARY_SHRINK);
    let mut tertiary = tint_red(&imageops::resize(tertiary, ter_w, ter_h, FilterType::Lanczos3));
    scale_brightness(&mut tertiary, TERTIARY_BRIGHTNESS);
    let (ter_x, ter_y) = tertiary_offset(dims, (ter_w, ter_h));
    imageops::overlay(&mut canvas, &tertiary, ter_x, ter_y);
    debug!(ter_w, ter_h, ter_x, ter_y, "pasted tertiary overlay");

    canvas
}

/// Scale the RGB channels by `factor`, leaving alpha untouched.
fn scale_brightness(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = (f32::from(*channel) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Keep the red channel, flatten green and blue to
/// [`TERTIARY_CHANNEL_LEVEL`], keep alpha.
fn tint_red(image: &RgbaImage) -> RgbaImage {
    let mut tinted = image.clone();
    for pixel in tinted.pixels_mut() {
        pixel.0[1] = TERTIARY_CHANNEL_LEVEL;
        pixel.0[2] = TERTIARY_CHANNEL_LEVEL;
    }
    tinted
}
