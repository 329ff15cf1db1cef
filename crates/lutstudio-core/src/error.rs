//! Error type shared by the grading pipeline.

/// Errors raised by the grading pipeline.
///
/// Gamut clipping and empty tonal zones are not errors: both are resolved
/// silently by clamping and fallback statistics.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("pixel buffer length {len} is not a multiple of 4 (RGBA8)")]
    UnalignedBuffer { len: usize },

    #[error("pixel buffer holds {len} bytes but {width}x{height} RGBA8 needs {expected}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },

    #[error("Hald image must be {expected}x{expected}, got {width}x{height}")]
    HaldSize {
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error(".cube parse error at line {line}: {message}")]
    CubeParse { line: usize, message: String },

    #[error("render superseded by a newer adjustment snapshot")]
    Cancelled,

    #[error("failed to parse adjustments: {0}")]
    Adjustments(#[from] serde_json::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
