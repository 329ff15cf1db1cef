//! Selective color: eight fixed hue bands plus a skin-tone gate.
//!
//! The band edges and skin thresholds are empirically chosen constants.
//! Graded looks depend on the exact boundaries, so they are pinned by tests
//! and must not drift.
//!
//! ```text
//!   0°    15°    45°    75°          165°   195°        255°        315°  345° 360°
//!   | red | orange | yellow | green    | cyan | blue      | purple    | mag | red |
//! ```

use serde::{Deserialize, Serialize};

use crate::color_management::{hsl_to_rgb, rgb_to_hsl};
use crate::transform::params::{BandAdjustments, HslAdjustment};

/// One of the eight named hue bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HueBand {
    Reds,
    Oranges,
    Yellows,
    Greens,
    Cyans,
    Blues,
    Purples,
    Magentas,
}

impl HueBand {
    /// All bands in hue order starting at red.
    pub const ALL: [HueBand; 8] = [
        HueBand::Reds,
        HueBand::Oranges,
        HueBand::Yellows,
        HueBand::Greens,
        HueBand::Cyans,
        HueBand::Blues,
        HueBand::Purples,
        HueBand::Magentas,
    ];

    /// Classify a hue in degrees. Total over all finite inputs; the hue is
    /// wrapped onto `[0, 360)` first.
    ///
    /// Lower edges are inclusive, upper edges exclusive. Reds wrap through
    /// 0°: `[345°, 360°) ∪ [0°, 15°)`.
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(360.0);
        match h {
            h if h < 15.0 => Self::Reds,
            h if h < 45.0 => Self::Oranges,
            h if h < 75.0 => Self::Yellows,
            h if h < 165.0 => Self::Greens,
            h if h < 195.0 => Self::Cyans,
            h if h < 255.0 => Self::Blues,
            h if h < 315.0 => Self::Purples,
            h if h < 345.0 => Self::Magentas,
            _ => Self::Reds,
        }
    }
}

/// Skin-tone heuristic on HSL (degrees, percent).
///
/// ```text
/// 0° < hue < 45°  and  saturation > 8 %  and  lightness > 15 %
/// ```
///
/// All three bounds are exclusive.
pub fn is_skin_tone(hsl: [f32; 3]) -> bool {
    let [h, s, l] = hsl;
    h > 0.0 && h < 45.0 && s > 8.0 && l > 15.0
}

/// Apply skin and band shifts to one 8-bit-scale RGB pixel.
///
/// The skin gate is evaluated on the incoming hue; the band is chosen from
/// the hue after any skin shift. Saturation and lightness are clamped to
/// `[0, 100]` before converting back.
pub fn apply_selective(
    rgb: [f32; 3],
    bands: &BandAdjustments,
    skin: &HslAdjustment,
) -> [f32; 3] {
    let hsl = rgb_to_hsl(rgb);
    let [mut h, mut s, mut l] = hsl;

    if !skin.is_neutral() && is_skin_tone(hsl) {
        h += skin.hue_shift;
        s += skin.saturation_shift;
        l += skin.lightness_shift;
    }

    let band = bands.get(HueBand::from_hue(h));
    h += band.hue_shift;
    s += band.saturation_shift;
    l += band.lightness_shift;

    hsl_to_rgb([h, s.clamp(0.0, 100.0), l.clamp(0.0, 100.0)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_are_pinned() {
        let cases = [
            (0.0, HueBand::Reds),
            (14.99, HueBand::Reds),
            (15.0, HueBand::Oranges),
            (44.99, HueBand::Oranges),
            (45.0, HueBand::Yellows),
            (75.0, HueBand::Greens),
            (164.99, HueBand::Greens),
            (165.0, HueBand::Cyans),
            (195.0, HueBand::Blues),
            (255.0, HueBand::Purples),
            (315.0, HueBand::Magentas),
            (344.99, HueBand::Magentas),
            (345.0, HueBand::Reds),
            (359.99, HueBand::Reds),
        ];
        for (hue, band) in cases {
            assert_eq!(HueBand::from_hue(hue), band, "hue {hue}");
        }
    }

    #[test]
    fn test_band_lookup_wraps() {
        assert_eq!(HueBand::from_hue(360.0), HueBand::Reds);
        assert_eq!(HueBand::from_hue(-10.0), HueBand::Reds);
        assert_eq!(HueBand::from_hue(-60.0), HueBand::Purples);
        assert_eq!(HueBand::from_hue(420.0), HueBand::Yellows);
    }

    #[test]
    fn test_skin_gate_hue_boundary_is_exclusive() {
        assert!(is_skin_tone([44.9, 8.1, 15.1]));
        assert!(!is_skin_tone([45.1, 8.1, 15.1]));
        assert!(!is_skin_tone([45.0, 50.0, 50.0]));
        assert!(!is_skin_tone([0.0, 50.0, 50.0]));
    }

    #[test]
    fn test_skin_gate_saturation_and_lightness_floors() {
        assert!(!is_skin_tone([20.0, 8.0, 50.0]));
        assert!(!is_skin_tone([20.0, 50.0, 15.0]));
        assert!(is_skin_tone([20.0, 8.01, 15.01]));
    }

    #[test]
    fn test_band_shift_only_touches_its_band() {
        let mut bands = BandAdjustments::default();
        bands.blues.lightness_shift = 20.0;
        let skin = HslAdjustment::default();

        let blue = [30.0, 60.0, 200.0];
        let out = apply_selective(blue, &bands, &skin);
        assert!(rgb_to_hsl(out)[2] > rgb_to_hsl(blue)[2] + 19.0);

        let green = [40.0, 180.0, 60.0];
        let out = apply_selective(green, &bands, &skin);
        for c in 0..3 {
            assert!((out[c] - green[c]).abs() < 0.01);
        }
    }

    #[test]
    fn test_skin_shift_feeds_band_selection() {
        // Orange skin pixel pushed by the skin hue shift into the yellows.
        let mut bands = BandAdjustments::default();
        bands.yellows.saturation_shift = -100.0;
        let skin = HslAdjustment::new(30.0, 0.0, 0.0);

        let skin_pixel = hsl_to_rgb([30.0, 50.0, 60.0]);
        let out = apply_selective(skin_pixel, &bands, &skin);
        let hsl = rgb_to_hsl(out);
        assert!(hsl[1] < 0.5, "landed in yellows and was desaturated: {hsl:?}");
    }

    #[test]
    fn test_saturation_clamped_to_range() {
        let mut bands = BandAdjustments::default();
        bands.reds.saturation_shift = 500.0;
        let out = apply_selective([200.0, 50.0, 50.0], &bands, &HslAdjustment::default());
        for c in out {
            assert!((-0.01..=255.01).contains(&c), "{out:?}");
        }
    }
}
