//! QR symbol synthesis.
//!
//! Renders a text payload as an RGBA raster so the compositor can resize,
//! recolor, and alpha-paste it. Each symbol is parameterized by a version
//! hint (density), an error-correction level, and a module pixel size; a
//! quiet zone of [`QUIET_ZONE_MODULES`] modules surrounds every symbol.
//!
//! The version hint is a floor, not a ceiling: when the payload does not
//! fit at the hinted version, the next versions are tried in order until
//! one holds it, failing only past version 40.

use image::{Rgba, RgbaImage};
use qrcode::types::QrError;
use qrcode::{QrCode, Version};
use tracing::debug;

pub use qrcode::EcLevel;

/// Width of the quiet zone, in modules, on each side of a symbol.
pub const QUIET_ZONE_MODULES: u32 = 4;

/// Highest QR symbol version.
const MAX_VERSION: i16 = 40;

/// Synthesis error types.
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    #[error("payload of {len} bytes does not fit any QR version at the requested error correction")]
    Capacity { len: usize },
    #[error("QR encoding failed: {0}")]
    Encode(#[from] QrError),
}

/// Rendering parameters for one QR symbol.
#[derive(Clone, Copy, Debug)]
pub struct SymbolSpec {
    /// Smallest symbol version (density tier) to try.
    pub version_hint: i16,
    /// Error-correction level; higher trades capacity for resilience.
    pub ec_level: EcLevel,
    /// Side length of one module in pixels.
    pub module_px: u32,
    /// Color of dark modules.
    pub dark: Rgba<u8>,
    /// Color of light modules and the quiet zone.
    pub light: Rgba<u8>,
}

impl SymbolSpec {
    /// Spec with opaque black modules on an opaque white background.
    pub const fn new(version_hint: i16, ec_level: EcLevel, module_px: u32) -> Self {
        Self {
            version_hint,
            ec_level,
            module_px,
            dark: Rgba([0, 0, 0, 255]),
            light: Rgba([255, 255, 255, 255]),
        }
    }
}

/// Render a payload as an RGBA QR raster.
///
/// The output side length is `(modules + 2 * quiet zone) * module_px`
/// where `modules = 4 * version + 17` for the version that fit.
pub fn render(payload: &str, spec: &SymbolSpec) -> Result<RgbaImage, SymbolError> {
    let code = encode_with_fit(payload.as_bytes(), spec.version_hint, spec.ec_level)?;
    let image = code
        .render::<Rgba<u8>>()
        .quiet_zone(true)
        .module_dimensions(spec.module_px, spec.module_px)
        .dark_color(spec.dark)
        .light_color(spec.light)
        .build();
    debug!(
        payload_len = payload.len(),
        width = image.width(),
        height = image.height(),
        "rendered QR symbol"
    );
    Ok(image)
}

/// Encode starting at the hinted version, growing until the payload fits.
fn encode_with_fit(payload: &[u8], version_hint: i16, ec_level: EcLevel) -> Result<QrCode, SymbolError> {
    for version in version_hint..=MAX_VERSION {
        match QrCode::with_version(payload, Version::Normal(version), ec_level) {
            Ok(code) => {
                if version > version_hint {
                    debug!(version_hint, version, "payload did not fit hinted version");
                }
                return Ok(code);
            }
            Err(QrError::DataTooLong) => continue,
            Err(err) => return Err(SymbolError::Encode(err)),
        }
    }
    Err(SymbolError::Capacity {
        len: payload.len(),
    })
}
