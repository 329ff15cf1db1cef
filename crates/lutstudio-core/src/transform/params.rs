//! The adjustment snapshot consumed by the grading pass.
//!
//! `ColorAdjustments` is the single source of truth for user-controlled
//! grading. The UI owns its lifecycle; the engine only ever sees an
//! immutable snapshot of it. Field aliases accept the short names used by
//! earlier front ends (`temp`, `hsl`, `hue`, ...).

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::grading::selective::HueBand;

/// A control point on a tone curve. Both axes are normalised to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Default control points: the identity line with three interior handles.
const IDENTITY_CURVE: [CurvePoint; 5] = [
    CurvePoint::new(0.0, 0.0),
    CurvePoint::new(0.25, 0.25),
    CurvePoint::new(0.5, 0.5),
    CurvePoint::new(0.75, 0.75),
    CurvePoint::new(1.0, 1.0),
];

/// Four independently edited tone curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSet {
    /// Applied to every channel after its own curve.
    pub master: Vec<CurvePoint>,
    pub red: Vec<CurvePoint>,
    pub green: Vec<CurvePoint>,
    pub blue: Vec<CurvePoint>,
}

impl Default for CurveSet {
    fn default() -> Self {
        Self {
            master: IDENTITY_CURVE.to_vec(),
            red: IDENTITY_CURVE.to_vec(),
            green: IDENTITY_CURVE.to_vec(),
            blue: IDENTITY_CURVE.to_vec(),
        }
    }
}

/// Additive hue/saturation/lightness shift for one band of colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HslAdjustment {
    /// Hue rotation in degrees.
    #[serde(alias = "hue")]
    pub hue_shift: f32,
    /// Saturation shift in percentage points.
    #[serde(alias = "saturation")]
    pub saturation_shift: f32,
    /// Lightness shift in percentage points.
    #[serde(alias = "lightness")]
    pub lightness_shift: f32,
}

impl HslAdjustment {
    pub const fn new(hue_shift: f32, saturation_shift: f32, lightness_shift: f32) -> Self {
        Self {
            hue_shift,
            saturation_shift,
            lightness_shift,
        }
    }

    /// True when all three shifts are zero.
    pub fn is_neutral(&self) -> bool {
        self.hue_shift == 0.0 && self.saturation_shift == 0.0 && self.lightness_shift == 0.0
    }
}

/// Selective-color shifts for the eight named hue bands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandAdjustments {
    pub reds: HslAdjustment,
    pub oranges: HslAdjustment,
    pub yellows: HslAdjustment,
    pub greens: HslAdjustment,
    pub cyans: HslAdjustment,
    pub blues: HslAdjustment,
    pub purples: HslAdjustment,
    pub magentas: HslAdjustment,
}

impl BandAdjustments {
    /// The shift assigned to `band`.
    pub fn get(&self, band: HueBand) -> &HslAdjustment {
        match band {
            HueBand::Reds => &self.reds,
            HueBand::Oranges => &self.oranges,
            HueBand::Yellows => &self.yellows,
            HueBand::Greens => &self.greens,
            HueBand::Cyans => &self.cyans,
            HueBand::Blues => &self.blues,
            HueBand::Purples => &self.purples,
            HueBand::Magentas => &self.magentas,
        }
    }

    /// Mutable access to the shift assigned to `band`.
    pub fn get_mut(&mut self, band: HueBand) -> &mut HslAdjustment {
        match band {
            HueBand::Reds => &mut self.reds,
            HueBand::Oranges => &mut self.oranges,
            HueBand::Yellows => &mut self.yellows,
            HueBand::Greens => &mut self.greens,
            HueBand::Cyans => &mut self.cyans,
            HueBand::Blues => &mut self.blues,
            HueBand::Purples => &mut self.purples,
            HueBand::Magentas => &mut self.magentas,
        }
    }

    /// True when no band carries a shift.
    pub fn is_neutral(&self) -> bool {
        HueBand::ALL.iter().all(|&band| self.get(band).is_neutral())
    }
}

/// Every slider, curve and band the user can touch.
///
/// `Default` is the neutral grade: the image passes through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAdjustments {
    /// Additive brightness, in hundredths of full scale.
    pub brightness: f32,
    /// Contrast around mid-gray. `-100` flattens to gray, `0` is neutral.
    pub contrast: f32,
    /// Saturation relative to luma. `-100` is grayscale, `0` is neutral.
    pub saturation: f32,
    /// Blue–yellow shift, applied on LAB b* after dividing by 5.
    #[serde(alias = "temp")]
    pub temperature: f32,
    /// Green–magenta shift, applied on LAB a* after dividing by 5.
    pub tint: f32,
    pub curves: CurveSet,
    #[serde(alias = "hsl")]
    pub bands: BandAdjustments,
    /// Shift applied to pixels passing the skin-tone gate.
    pub skin: HslAdjustment,
}

impl ColorAdjustments {
    /// Parse a snapshot from JSON. Missing fields take their neutral value.
    pub fn from_json(json: &str) -> Result<Self, GradeError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let adj = ColorAdjustments::default();
        assert!(adj.bands.is_neutral());
        assert!(adj.skin.is_neutral());
        assert_eq!(adj.curves.master.len(), 5);
        assert_eq!(adj.curves.master[0], CurvePoint::new(0.0, 0.0));
        assert_eq!(adj.curves.master[4], CurvePoint::new(1.0, 1.0));
    }

    #[test]
    fn test_from_json_accepts_short_field_names() {
        let json = r#"{
            "brightness": 10,
            "temp": -20,
            "hsl": { "blues": { "hue": 15, "saturation": -5 } },
            "skin": { "lightness": 3 }
        }"#;
        let adj = ColorAdjustments::from_json(json).unwrap();
        assert_eq!(adj.brightness, 10.0);
        assert_eq!(adj.temperature, -20.0);
        assert_eq!(adj.bands.blues, HslAdjustment::new(15.0, -5.0, 0.0));
        assert_eq!(adj.skin.lightness_shift, 3.0);
        assert_eq!(adj.curves, CurveSet::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = ColorAdjustments::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GradeError::Adjustments(_)));
    }

    #[test]
    fn test_band_accessors_agree() {
        let mut bands = BandAdjustments::default();
        bands.get_mut(HueBand::Cyans).hue_shift = 12.0;
        assert_eq!(bands.cyans.hue_shift, 12.0);
        assert!(!bands.is_neutral());
        assert!(bands.get(HueBand::Reds).is_neutral());
    }
}
