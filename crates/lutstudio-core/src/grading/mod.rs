//! Grading math: zone statistics, statistical transfer, curves, sliders,
//! and selective color.

pub mod adjust;
pub mod curves;
pub mod selective;
pub mod sliders;
pub mod stats;
pub mod transfer;
