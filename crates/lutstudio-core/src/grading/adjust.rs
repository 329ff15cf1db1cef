//! Full adjustment chain for one snapshot, applied per pixel.
//!
//! ```text
//!   in ──→ channel curve ──→ master curve ──→ brightness/contrast
//!      ──→ skin + band HSL ──→ saturation ──→ temperature/tint (LAB) ──→ out
//! ```
//!
//! Each stage is skipped when its parameters are neutral. The HSL and LAB
//! round trips are lossy, so a neutral snapshot must never reach them.

use crate::error::GradeError;
use crate::grading::curves::CurveLuts;
use crate::grading::selective::apply_selective;
use crate::grading::sliders::{apply_brightness_contrast, apply_saturation, apply_temperature_tint};
use crate::image::{CHANNELS, PixelBuffer};
use crate::parallel::{DEFAULT_PARALLEL_THRESHOLD, ExecContext, map_all_rows, map_rows};
use crate::transform::params::{BandAdjustments, ColorAdjustments, HslAdjustment};

/// A snapshot with its curve tables baked and its stage switches resolved.
///
/// Build once per snapshot and reuse across every pixel (and across both the
/// preview and the LUT pass).
#[derive(Debug, Clone)]
pub struct PreparedAdjustments {
    luts: CurveLuts,
    curves_active: bool,
    brightness: f32,
    contrast: f32,
    selective: Option<(BandAdjustments, HslAdjustment)>,
    saturation: f32,
    temperature: f32,
    tint: f32,
}

impl PreparedAdjustments {
    pub fn new(adjustments: &ColorAdjustments) -> Self {
        let luts = CurveLuts::new(&adjustments.curves);
        let curves_active = !luts.is_identity();
        let selective_active =
            !adjustments.bands.is_neutral() || !adjustments.skin.is_neutral();

        let prepared = Self {
            luts,
            curves_active,
            brightness: adjustments.brightness,
            contrast: adjustments.contrast,
            selective: selective_active.then_some((adjustments.bands, adjustments.skin)),
            saturation: adjustments.saturation,
            temperature: adjustments.temperature,
            tint: adjustments.tint,
        };
        tracing::debug!(
            curves = prepared.curves_active,
            selective = selective_active,
            lab = prepared.temperature != 0.0 || prepared.tint != 0.0,
            "prepared adjustment snapshot"
        );
        prepared
    }

    /// True when every stage would be skipped.
    pub fn is_identity(&self) -> bool {
        !self.curves_active
            && self.brightness == 0.0
            && self.contrast == 0.0
            && self.selective.is_none()
            && self.saturation == 0.0
            && self.temperature == 0.0
            && self.tint == 0.0
    }

    /// Run the chain on one pixel and store it as bytes.
    #[inline]
    pub fn apply_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let rgb = if self.curves_active {
            self.luts.apply(rgb)
        } else {
            rgb
        };
        let mut px = rgb.map(f32::from);

        px = apply_brightness_contrast(px, self.brightness, self.contrast);
        if let Some((bands, skin)) = &self.selective {
            px = apply_selective(px, bands, skin);
        }
        px = apply_saturation(px, self.saturation);
        px = apply_temperature_tint(px, self.temperature, self.tint);

        px.map(|c| c.clamp(0.0, 255.0).round() as u8)
    }

    /// Apply to `src` into caller-provided storage of the same length.
    pub fn apply_into(
        &self,
        src: &PixelBuffer,
        out: &mut [u8],
        exec: &ExecContext<'_>,
    ) -> Result<(), GradeError> {
        if self.is_identity() {
            exec.cancel.map(|token| token.check()).transpose()?;
            out.copy_from_slice(src.as_bytes());
            return Ok(());
        }

        map_rows(src.as_bytes(), out, src.row_stride(), exec, |s_row, d_row| {
            self.apply_row(s_row, d_row)
        })
    }

    /// Apply to `src`, producing a new buffer.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        if self.is_identity() {
            return src.clone();
        }
        let mut out = vec![0u8; src.as_bytes().len()];
        map_all_rows(
            src.as_bytes(),
            &mut out,
            src.row_stride(),
            DEFAULT_PARALLEL_THRESHOLD,
            |s_row, d_row| self.apply_row(s_row, d_row),
        );
        PixelBuffer::from_parts(src.width(), src.height(), out)
    }

    fn apply_row(&self, src: &[u8], dst: &mut [u8]) {
        for (s, d) in src.chunks_exact(CHANNELS).zip(dst.chunks_exact_mut(CHANNELS)) {
            let rgb = self.apply_pixel([s[0], s[1], s[2]]);
            d[..3].copy_from_slice(&rgb);
            d[3] = s[3];
        }
    }
}

/// Apply a full adjustment snapshot to a buffer.
pub fn apply_adjustments(buffer: &PixelBuffer, adjustments: &ColorAdjustments) -> PixelBuffer {
    PreparedAdjustments::new(adjustments).apply(buffer)
}
