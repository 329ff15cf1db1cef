//! Adjustment parameters, Hald synthesis, and 3D LUT operations.

pub mod hald;
pub mod lut;
pub mod params;
