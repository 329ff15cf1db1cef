//! Zone-interpolated statistical color transfer (Reinhard-style) in CIELAB.
//!
//! Each target pixel is moved so that the target's statistics around its
//! lightness map onto the reference's statistics around the same lightness.
//!
//! # Formula
//! For each channel `c` in `{L*, a*, b*}`:
//! ```text
//!   out[c] = (in[c] − targetMean[c]) × sourceStd[c] / targetStd[c] + sourceMean[c]
//! ```
//! with L* then clamped to `[0, 100]`. The means and stds are blended between
//! adjacent zones by the pixel's own L*, so there is no step at 33 or 66:
//! ```text
//!   L ≤ 33       shadows  → midtones    t = L / 33
//!   33 < L ≤ 66  midtones → highlights  t = (L − 33) / 33
//!   L > 66       highlights only
//! ```

use glam::Vec3;

use crate::color_management::{lab_to_rgb, rgb_to_lab};
use crate::grading::stats::{AdvancedStats, ColorStats, HIGHLIGHT_LIMIT, SHADOW_LIMIT};
use crate::image::{CHANNELS, PixelBuffer};
use crate::parallel::{DEFAULT_PARALLEL_THRESHOLD, map_all_rows};

/// Width of each blend band in L*.
const ZONE_SPAN: f32 = 33.0;

/// Blend zone statistics for a pixel of lightness `l`.
pub fn blended_zone(stats: &AdvancedStats, l: f32) -> ColorStats {
    if l <= SHADOW_LIMIT {
        stats.shadows.lerp(&stats.midtones, l / ZONE_SPAN)
    } else if l <= HIGHLIGHT_LIMIT {
        stats.midtones.lerp(&stats.highlights, (l - SHADOW_LIMIT) / ZONE_SPAN)
    } else {
        stats.highlights
    }
}

/// Transfer one 8-bit-scale RGB pixel from target statistics to source statistics.
pub fn transfer_pixel(
    rgb: [f32; 3],
    source_stats: &AdvancedStats,
    target_stats: &AdvancedStats,
) -> [f32; 3] {
    let lab = Vec3::from_array(rgb_to_lab(rgb));
    let source = blended_zone(source_stats, lab.x);
    let target = blended_zone(target_stats, lab.x);

    let mut out = (lab - target.mean) * (source.std / target.std) + source.mean;
    out.x = out.x.clamp(0.0, 100.0);
    lab_to_rgb(out.to_array())
}

/// Map `target` onto `source_stats`, producing a new buffer.
///
/// `target_stats` should describe `target` itself (or, for LUT export, the
/// synthetic [`AdvancedStats::NEUTRAL_EXPORT_TARGET`]). Alpha is copied.
pub fn transfer(
    target: &PixelBuffer,
    source_stats: &AdvancedStats,
    target_stats: &AdvancedStats,
) -> PixelBuffer {
    let mut out = vec![0u8; target.as_bytes().len()];
    transfer_into(
        target,
        &mut out,
        source_stats,
        target_stats,
        DEFAULT_PARALLEL_THRESHOLD,
    );
    PixelBuffer::from_parts(target.width(), target.height(), out)
}

/// [`transfer`] into caller-provided storage of the same length.
pub fn transfer_into(
    target: &PixelBuffer,
    out: &mut [u8],
    source_stats: &AdvancedStats,
    target_stats: &AdvancedStats,
    parallel_threshold: usize,
) {
    let row_len = target.row_stride();
    map_all_rows(target.as_bytes(), out, row_len, parallel_threshold, |src, dst| {
        for (s, d) in src.chunks_exact(CHANNELS).zip(dst.chunks_exact_mut(CHANNELS)) {
            let rgb = transfer_pixel(
                [s[0] as f32, s[1] as f32, s[2] as f32],
                source_stats,
                target_stats,
            );
            d[0] = rgb[0].round() as u8;
            d[1] = rgb[1].round() as u8;
            d[2] = rgb[2].round() as u8;
            d[3] = s[3];
        }
    });
}
