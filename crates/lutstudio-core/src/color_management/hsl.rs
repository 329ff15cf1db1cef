//! Cylindrical HSL transform on 8-bit-scale RGB.
//!
//! Hue is in degrees `[0, 360)`, saturation and lightness in percent
//! `[0, 100]`. These are the units the selective-color bands and the
//! skin-tone gate are written in.

/// Convert 8-bit-scale RGB to `[hue°, saturation %, lightness %]`.
pub fn rgb_to_hsl(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb.map(|c| c / 255.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lum = (max + min) * 0.5;

    if max == min {
        return [0.0, 0.0, lum * 100.0];
    }

    let delta = max - min;
    let sat = if lum > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let hue = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    [hue * 60.0, sat * 100.0, lum * 100.0]
}

/// Convert `[hue°, saturation %, lightness %]` to 8-bit-scale RGB.
///
/// Hue wraps, so shifted hues outside `[0, 360)` are accepted.
pub fn hsl_to_rgb(hsl: [f32; 3]) -> [f32; 3] {
    let h = hsl[0].rem_euclid(360.0) / 360.0;
    let s = hsl[1] / 100.0;
    let l = hsl[2] / 100.0;

    if s == 0.0 {
        return [l * 255.0; 3];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_rgb(p, q, h) * 255.0,
        hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0,
    ]
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_primaries_have_expected_hues() {
        let cases = [
            ([255.0, 0.0, 0.0], 0.0),
            ([255.0, 255.0, 0.0], 60.0),
            ([0.0, 255.0, 0.0], 120.0),
            ([0.0, 255.0, 255.0], 180.0),
            ([0.0, 0.0, 255.0], 240.0),
            ([255.0, 0.0, 255.0], 300.0),
        ];
        for (rgb, hue) in cases {
            let hsl = rgb_to_hsl(rgb);
            assert!((hsl[0] - hue).abs() < EPSILON, "{rgb:?}: {hsl:?}");
            assert!((hsl[1] - 100.0).abs() < EPSILON);
            assert!((hsl[2] - 50.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_gray_has_zero_saturation() {
        let hsl = rgb_to_hsl([128.0, 128.0, 128.0]);
        assert_eq!(hsl[0], 0.0);
        assert_eq!(hsl[1], 0.0);
        assert!((hsl[2] - 50.196).abs() < EPSILON);
    }

    #[test]
    fn test_hsl_roundtrip_within_one_unit() {
        for r in (0..=255).step_by(15) {
            for g in (0..=255).step_by(15) {
                for b in (0..=255).step_by(15) {
                    let rgb = [r as f32, g as f32, b as f32];
                    let back = hsl_to_rgb(rgb_to_hsl(rgb));
                    for c in 0..3 {
                        assert!(
                            (back[c] - rgb[c]).abs() <= 1.0,
                            "{rgb:?} -> {back:?} (channel {c})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_hue_wraps_outside_circle() {
        let a = hsl_to_rgb([-30.0, 80.0, 50.0]);
        let b = hsl_to_rgb([330.0, 80.0, 50.0]);
        let c = hsl_to_rgb([690.0, 80.0, 50.0]);
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < EPSILON);
            assert!((c[i] - b[i]).abs() < EPSILON);
        }
    }
}
