//! Color space conversions: sRGB ↔ CIELAB and sRGB ↔ HSL.
//!
//! All functions are pure and operate on `[f32; 3]` triples with RGB on
//! the 8-bit scale `[0, 255]`.

pub mod hsl;
pub mod lab;

pub use hsl::{hsl_to_rgb, rgb_to_hsl};
pub use lab::{lab_to_rgb, rgb_to_lab};
