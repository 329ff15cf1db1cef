//! Slider-based grading adjustments (brightness/contrast, saturation, temperature/tint).
//!
//! Every function works on 8-bit-scale RGB floats and returns its input
//! untouched when its parameters are neutral. Intermediate values are not
//! clamped; the final store to bytes does that.

use crate::color_management::{lab_to_rgb, rgb_to_lab};

/// Luma weights used as the desaturation reference.
const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Slider units per LAB unit for temperature and tint.
pub const TEMP_TINT_SCALE: f32 = 5.0;

/// Apply brightness and contrast to all three channels.
///
/// ```text
/// bright   = brightness / 100
/// contrast = (contrast + 100) / 100
/// out = ((in / 255 − 0.5) × contrast + 0.5 + bright) × 255
/// ```
///
/// `brightness = 0` and `contrast = 0` produce no change.
pub fn apply_brightness_contrast(rgb: [f32; 3], brightness: f32, contrast: f32) -> [f32; 3] {
    if brightness == 0.0 && contrast == 0.0 {
        return rgb;
    }

    let bright = brightness / 100.0;
    let factor = (contrast + 100.0) / 100.0;
    rgb.map(|c| ((c / 255.0 - 0.5) * factor + 0.5 + bright) * 255.0)
}

/// Blend each channel toward its luma-weighted gray.
///
/// ```text
/// gray = 0.2989 R + 0.5870 G + 0.1140 B
/// out  = gray + (in − gray) × (saturation + 100) / 100
/// ```
///
/// `saturation = 0` produces no change, `-100` produces grayscale, and
/// values above zero over-saturate.
pub fn apply_saturation(rgb: [f32; 3], saturation: f32) -> [f32; 3] {
    if saturation == 0.0 {
        return rgb;
    }

    let factor = (saturation + 100.0) / 100.0;
    let gray = rgb[0] * LUMA_WEIGHTS[0] + rgb[1] * LUMA_WEIGHTS[1] + rgb[2] * LUMA_WEIGHTS[2];
    rgb.map(|c| gray + (c - gray) * factor)
}

/// Shift white balance in CIELAB.
///
/// Temperature moves b* (blue–yellow) and tint moves a* (green–magenta),
/// each by `value / 5` LAB units.
///
/// Both at 0 produce no change; the LAB round trip is skipped entirely.
pub fn apply_temperature_tint(rgb: [f32; 3], temperature: f32, tint: f32) -> [f32; 3] {
    if temperature == 0.0 && tint == 0.0 {
        return rgb;
    }

    let mut lab = rgb_to_lab(rgb);
    lab[1] += tint / TEMP_TINT_SCALE;
    lab[2] += temperature / TEMP_TINT_SCALE;
    lab_to_rgb(lab)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_brightness_contrast_zero_is_identity() {
        let rgb = [30.0, 128.0, 240.0];
        assert_eq!(apply_brightness_contrast(rgb, 0.0, 0.0), rgb);
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        let mid = [127.5; 3];
        let out = apply_brightness_contrast(mid, 0.0, 60.0);
        for c in out {
            assert!((c - 127.5).abs() < EPSILON);
        }

        let bright = apply_brightness_contrast([200.0; 3], 0.0, 50.0);
        assert!(bright[0] > 200.0, "contrast should push highlights up");
        let dark = apply_brightness_contrast([50.0; 3], 0.0, 50.0);
        assert!(dark[0] < 50.0, "contrast should push shadows down");
    }

    #[test]
    fn test_contrast_minus_hundred_flattens_to_gray() {
        let out = apply_brightness_contrast([10.0, 90.0, 250.0], 0.0, -100.0);
        for c in out {
            assert!((c - 127.5).abs() < EPSILON);
        }
    }

    #[test]
    fn test_brightness_adds_fraction_of_full_scale() {
        let out = apply_brightness_contrast([100.0; 3], 10.0, 0.0);
        assert!((out[0] - 125.5).abs() < EPSILON);
    }

    #[test]
    fn test_saturation_zero_is_identity() {
        let rgb = [200.0, 100.0, 50.0];
        assert_eq!(apply_saturation(rgb, 0.0), rgb);
    }

    #[test]
    fn test_saturation_minus_hundred_produces_grayscale() {
        let out = apply_saturation([200.0, 100.0, 50.0], -100.0);
        assert!((out[0] - out[1]).abs() < EPSILON);
        assert!((out[1] - out[2]).abs() < EPSILON);
        let gray = 200.0 * 0.2989 + 100.0 * 0.5870 + 50.0 * 0.1140;
        assert!((out[0] - gray).abs() < EPSILON);
    }

    #[test]
    fn test_saturation_boost_spreads_channels() {
        let rgb = [200.0, 100.0, 50.0];
        let out = apply_saturation(rgb, 50.0);
        assert!(out[0] - out[2] > rgb[0] - rgb[2]);
    }

    #[test]
    fn test_temperature_tint_zero_is_identity() {
        let rgb = [12.0, 130.0, 250.0];
        assert_eq!(apply_temperature_tint(rgb, 0.0, 0.0), rgb);
    }

    #[test]
    fn test_warm_temperature_lowers_blue() {
        let gray = [128.0; 3];
        let warm = apply_temperature_tint(gray, 50.0, 0.0);
        assert!(warm[2] < gray[2] - 1.0, "{warm:?}");
        let cool = apply_temperature_tint(gray, -50.0, 0.0);
        assert!(cool[2] > gray[2] + 1.0, "{cool:?}");
    }

    #[test]
    fn test_positive_tint_moves_toward_magenta() {
        let out = apply_temperature_tint([128.0; 3], 0.0, 50.0);
        assert!(out[1] < 128.0, "green should drop: {out:?}");
        assert!(out[0] > out[1] && out[2] > out[1]);
    }
}
