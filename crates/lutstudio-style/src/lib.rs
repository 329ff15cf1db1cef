//! LutStudio Style: best-effort AI descriptions of a reference image's look.
//!
//! A style profile is a two-word name, a short description and a five-color
//! palette. It is display data only and never feeds the grading pipeline;
//! requests run on their own tokio task and may fail without consequence.

pub mod analyzer;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod profile;
pub mod retry;

pub use analyzer::{StyleAnalyzer, StyleBackend, StyleRequest, spawn_analysis};
pub use error::StyleError;
#[cfg(feature = "gemini")]
pub use gemini::GeminiBackend;
pub use profile::{StyleProfile, normalize_palette, normalize_style_name, parse_profile};
pub use retry::RetryPolicy;
