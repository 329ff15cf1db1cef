//! sRGB ↔ CIELAB conversion through linear light and CIEXYZ (D65).
//!
//! ```text
//!   sRGB [0,255] ──→ linearize ──→ ×M ──→ XYZ / white ──→ f(t) ──→ L*a*b*
//!   L*a*b* ──→ f⁻¹(t) ──→ XYZ × white ──→ ×M⁻¹ ──→ encode ──→ clamp [0,255]
//! ```
//!
//! RGB values are floats on the 8-bit scale. L* is nominally `[0, 100]` but
//! neither direction clamps LAB; only the final RGB is clamped on the way
//! back, which is where out-of-gamut a*/b* excursions are absorbed.

/// sRGB → XYZ (D65) matrix, rows X, Y, Z.
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505],
];

/// XYZ (D65) → sRGB matrix, rows R, G, B.
const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.2406, -1.5372, -0.4986],
    [-0.9689, 1.8758, 0.0415],
    [0.0557, -0.2040, 1.0570],
];

/// D65 reference white, Y normalised to 1.
const WHITE_D65: [f32; 3] = [0.95047, 1.0, 1.08883];

/// CIELAB cube-root / linear threshold on normalised XYZ.
const LAB_EPSILON: f32 = 0.008856;
/// Slope of the linear segment near black.
const LAB_KAPPA: f32 = 7.787;
const LAB_OFFSET: f32 = 16.0 / 116.0;

/// sRGB transfer (IEC 61966-2-1), encoded → linear.
///
/// ```text
/// V <= 0.04045 → V / 12.92
/// V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
/// ```
pub fn srgb_to_linear(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer (IEC 61966-2-1), linear → encoded.
///
/// ```text
/// L <= 0.0031308 → L × 12.92
/// L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
/// ```
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert 8-bit-scale sRGB to CIELAB `[L, a, b]`.
pub fn rgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let lin = rgb.map(|c| srgb_to_linear(c / 255.0));
    let xyz = mat3_vec3(&RGB_TO_XYZ, lin);

    let fx = lab_f(xyz[0] / WHITE_D65[0]);
    let fy = lab_f(xyz[1] / WHITE_D65[1]);
    let fz = lab_f(xyz[2] / WHITE_D65[2]);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert CIELAB `[L, a, b]` to 8-bit-scale sRGB, clamped to `[0, 255]`.
pub fn lab_to_rgb(lab: [f32; 3]) -> [f32; 3] {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = lab[1] / 500.0 + fy;
    let fz = fy - lab[2] / 200.0;

    let xyz = [
        lab_f_inv(fx) * WHITE_D65[0],
        lab_f_inv(fy) * WHITE_D65[1],
        lab_f_inv(fz) * WHITE_D65[2],
    ];
    let lin = mat3_vec3(&XYZ_TO_RGB, xyz);

    lin.map(|c| (linear_to_srgb(c) * 255.0).clamp(0.0, 255.0))
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + LAB_OFFSET
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > LAB_EPSILON {
        cube
    } else {
        (f - LAB_OFFSET) / LAB_KAPPA
    }
}

fn mat3_vec3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_srgb_linearize_roundtrip_preserves_values() {
        for v in [0.0, 0.001, 0.04045, 0.1, 0.5, 0.9, 1.0] {
            let back = srgb_to_linear(linear_to_srgb(v));
            assert!((v - back).abs() < 1e-5, "roundtrip failed for {v}: {back}");
        }
    }

    #[test]
    fn test_black_and_white_endpoints() {
        let black = rgb_to_lab([0.0, 0.0, 0.0]);
        for c in black {
            assert!(c.abs() < EPSILON, "black should map to origin: {black:?}");
        }

        let white = rgb_to_lab([255.0, 255.0, 255.0]);
        assert!((white[0] - 100.0).abs() < 0.01, "white L = {}", white[0]);
        assert!(white[1].abs() < 0.05 && white[2].abs() < 0.05, "white a/b: {white:?}");

        let back = lab_to_rgb(white);
        for c in back {
            assert!((c - 255.0).abs() < 0.5, "white roundtrip: {back:?}");
        }
    }

    #[test]
    fn test_mid_gray_lightness() {
        // sRGB 119 sits very close to L* = 50.
        let lab = rgb_to_lab([119.0, 119.0, 119.0]);
        assert!((lab[0] - 50.0).abs() < 0.5, "L = {}", lab[0]);
    }

    #[test]
    fn test_lab_roundtrip_holds_for_every_rgb() {
        use rayon::prelude::*;

        // Every 8-bit color comes back to the same byte.
        (0..=255u32).into_par_iter().for_each(|r| {
            for g in 0..=255u32 {
                for b in 0..=255u32 {
                    let rgb = [r as f32, g as f32, b as f32];
                    let back = lab_to_rgb(rgb_to_lab(rgb));
                    for c in 0..3 {
                        assert!(
                            (back[c] - rgb[c]).abs() < 0.5,
                            "{rgb:?} -> {back:?} (channel {c})"
                        );
                    }
                }
            }
        });
    }

    #[test]
    fn test_lab_to_rgb_clamps_out_of_gamut() {
        let rgb = lab_to_rgb([50.0, 200.0, -200.0]);
        for c in rgb {
            assert!((0.0..=255.0).contains(&c));
        }
        let rgb = lab_to_rgb([120.0, 0.0, 0.0]);
        assert!(rgb.iter().all(|&c| c == 255.0));
    }

    #[test]
    fn test_red_is_positive_a_and_blue_is_negative_b() {
        let red = rgb_to_lab([255.0, 0.0, 0.0]);
        assert!(red[1] > 60.0, "red a* = {}", red[1]);
        let blue = rgb_to_lab([0.0, 0.0, 255.0]);
        assert!(blue[2] < -80.0, "blue b* = {}", blue[2]);
    }

    #[test]
    fn test_matches_palette_lab_closely() {
        use palette::{FromColor, Lab, Srgb};

        for rgb in [[200u8, 30, 60], [12, 140, 210], [90, 90, 90], [250, 240, 10]] {
            let ours = rgb_to_lab(rgb.map(f32::from));
            let srgb = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>();
            let theirs: Lab = Lab::from_color(srgb.into_linear());
            assert!((ours[0] - theirs.l).abs() < 0.5, "L {ours:?} vs {theirs:?}");
            assert!((ours[1] - theirs.a).abs() < 1.0, "a {ours:?} vs {theirs:?}");
            assert!((ours[2] - theirs.b).abs() < 1.0, "b {ours:?} vs {theirs:?}");
        }
    }
}
