//! LutStudio Core: reference-matched color grading.
//!
//! This crate holds the numeric pipeline: color-space conversions, per-zone
//! statistics, statistical color transfer, curve and selective adjustments,
//! Hald CLUT synthesis, and `.cube` export. No UI or network dependencies.

pub mod color_management;
pub mod config;
pub mod error;
pub mod grading;
pub mod image;
pub mod parallel;
pub mod pipeline;
pub mod transform;

// Re-exports for convenience.
pub use config::EngineConfig;
pub use error::GradeError;
pub use grading::adjust::{PreparedAdjustments, apply_adjustments};
pub use grading::stats::{AdvancedStats, ColorStats, compute_stats};
pub use grading::transfer::transfer;
pub use image::PixelBuffer;
pub use parallel::CancelToken;
pub use pipeline::coordinator::Regrader;
pub use pipeline::session::{GradingSession, RenderedGrade};
pub use transform::hald::generate_hald;
pub use transform::lut::Lut3D;
pub use transform::params::{ColorAdjustments, CurvePoint, CurveSet, HslAdjustment};
