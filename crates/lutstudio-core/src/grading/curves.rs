//! Piecewise-linear tone curves and 256-entry byte LUT baking.
//!
//! Curves are evaluated once per entry when a snapshot is prepared; the
//! per-pixel path only ever indexes the baked tables.
//!
//! # Complexity
//! - Evaluate: O(N log N) sort + O(N) scan
//! - Bake to byte LUT: O(N log N + 256 × N)

use crate::transform::params::{CurvePoint, CurveSet};

/// Entries in a baked curve table, one per 8-bit code value.
pub const CURVE_LUT_SIZE: usize = 256;

/// A baked curve: output code value for every input code value.
pub type CurveLut = [u8; CURVE_LUT_SIZE];

/// Evaluate a piecewise-linear curve at `t`.
///
/// Points are sorted by x first. Inputs left of the first point take its y,
/// inputs right of the last point take its y, and anything in between is
/// interpolated linearly between the bracketing pair. An empty curve is the
/// identity.
pub fn evaluate_curve(t: f32, points: &[CurvePoint]) -> f32 {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    evaluate_sorted(t, &sorted)
}

fn evaluate_sorted(t: f32, pts: &[CurvePoint]) -> f32 {
    let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
        return t;
    };
    if t <= first.x {
        return first.y;
    }
    if t >= last.x {
        return last.y;
    }

    for pair in pts.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        if t >= p1.x && t <= p2.x {
            let span = p2.x - p1.x;
            if span <= 0.0 {
                return p2.y;
            }
            let u = (t - p1.x) / span;
            return p1.y + u * (p2.y - p1.y);
        }
    }
    t
}

/// Bake a curve into a byte table by sampling it at `i / 255`.
///
/// Scaled results are clamped to `[0, 255]` and rounded to the nearest code.
pub fn build_lut(points: &[CurvePoint]) -> CurveLut {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut lut = [0u8; CURVE_LUT_SIZE];
    for (i, entry) in lut.iter_mut().enumerate() {
        let t = i as f32 / (CURVE_LUT_SIZE - 1) as f32;
        let v = evaluate_sorted(t, &sorted) * 255.0;
        *entry = v.clamp(0.0, 255.0).round() as u8;
    }
    lut
}

/// The four baked tables for one adjustment snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveLuts {
    pub master: CurveLut,
    pub red: CurveLut,
    pub green: CurveLut,
    pub blue: CurveLut,
}

impl CurveLuts {
    /// Bake all four curves of a [`CurveSet`].
    pub fn new(curves: &CurveSet) -> Self {
        Self {
            master: build_lut(&curves.master),
            red: build_lut(&curves.red),
            green: build_lut(&curves.green),
            blue: build_lut(&curves.blue),
        }
    }

    /// True when every table maps each code to itself.
    pub fn is_identity(&self) -> bool {
        [&self.master, &self.red, &self.green, &self.blue]
            .iter()
            .all(|lut| lut.iter().enumerate().all(|(i, &v)| v as usize == i))
    }

    /// Channel curve first, then master. The order matters.
    #[inline]
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        [
            self.master[self.red[rgb[0] as usize] as usize],
            self.master[self.green[rgb[1] as usize] as usize],
            self.master[self.blue[rgb[2] as usize] as usize],
        ]
    }
}
