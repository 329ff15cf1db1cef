//! A loaded reference/target pair and everything that does not depend on
//! the live adjustments.
//!
//! ```text
//!   reference ─┐                      ┌─→ base (transferred target) ─┐
//!              ├─ stats (in parallel) ┤                              ├─ adjustments ─→ preview / Hald LUT
//!   target ────┘                      └─→ transferred identity Hald ─┘
//! ```
//!
//! Both transfers run once per session. Only the adjustment pass runs on
//! every slider change. Every pass, preparation included, runs on the
//! session's worker pool sized by [`EngineConfig::worker_threads`].

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::GradeError;
use crate::grading::adjust::PreparedAdjustments;
use crate::grading::stats::{AdvancedStats, compute_stats_with};
use crate::grading::transfer::transfer_into;
use crate::image::PixelBuffer;
use crate::parallel::{CancelToken, ExecContext};
use crate::pipeline::pool::BufferPool;
use crate::transform::hald::generate_hald;
use crate::transform::lut::Lut3D;
use crate::transform::params::ColorAdjustments;

/// Output of one full regrade.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedGrade {
    /// The graded target image.
    pub preview: PixelBuffer,
    /// The graded 512×512 Hald image.
    pub hald: PixelBuffer,
}

impl RenderedGrade {
    /// Decode the graded Hald into a 64³ cube for `.cube` export.
    pub fn lut(&self) -> Result<Lut3D, GradeError> {
        Lut3D::from_hald(&self.hald)
    }
}

/// Precomputed state for grading one target against one reference.
#[derive(Debug)]
pub struct GradingSession {
    config: EngineConfig,
    workers: Arc<rayon::ThreadPool>,
    reference_stats: AdvancedStats,
    target_stats: AdvancedStats,
    base: PixelBuffer,
    hald_base: PixelBuffer,
    pool: BufferPool,
}

impl GradingSession {
    /// Prepare a session with the default configuration.
    pub fn new(reference: &PixelBuffer, target: &PixelBuffer) -> Result<Self, GradeError> {
        Self::with_config(reference, target, EngineConfig::default())
    }

    /// Prepare a session: extract both images' statistics, then run the
    /// statistical transfer on the target and on the identity Hald.
    pub fn with_config(
        reference: &PixelBuffer,
        target: &PixelBuffer,
        config: EngineConfig,
    ) -> Result<Self, GradeError> {
        let workers = Arc::new(config.build_thread_pool()?);
        let (reference_stats, target_stats, base, hald_base) =
            workers.install(|| prepare(reference, target, &config));
        tracing::info!(
            width = target.width(),
            height = target.height(),
            threads = workers.current_num_threads(),
            "grading session ready"
        );

        Ok(Self {
            pool: BufferPool::new(config.pool_capacity),
            config,
            workers,
            reference_stats,
            target_stats,
            base,
            hald_base,
        })
    }

    pub fn reference_stats(&self) -> &AdvancedStats {
        &self.reference_stats
    }

    pub fn target_stats(&self) -> &AdvancedStats {
        &self.target_stats
    }

    /// The target after the statistical transfer, before any adjustments.
    pub fn base(&self) -> &PixelBuffer {
        &self.base
    }

    /// The identity Hald after the statistical transfer.
    pub fn hald_base(&self) -> &PixelBuffer {
        &self.hald_base
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The worker pool every pass of this session runs on.
    pub fn workers(&self) -> &Arc<rayon::ThreadPool> {
        &self.workers
    }

    /// Apply adjustments to the transferred target.
    pub fn render_preview(
        &self,
        adjustments: &PreparedAdjustments,
        cancel: Option<&CancelToken>,
    ) -> Result<PixelBuffer, GradeError> {
        self.render_from(&self.base, adjustments, cancel)
    }

    /// Apply adjustments to the transferred Hald.
    pub fn render_lut(
        &self,
        adjustments: &PreparedAdjustments,
        cancel: Option<&CancelToken>,
    ) -> Result<PixelBuffer, GradeError> {
        self.render_from(&self.hald_base, adjustments, cancel)
    }

    /// Produce both outputs for one adjustment snapshot.
    ///
    /// A cancelled render returns `Err(Cancelled)` and gives its partial
    /// buffers back to the pool.
    pub fn render(
        &self,
        adjustments: &ColorAdjustments,
        cancel: Option<&CancelToken>,
    ) -> Result<RenderedGrade, GradeError> {
        let prepared = PreparedAdjustments::new(adjustments);
        let (preview, hald) = self.workers.install(|| {
            rayon::join(
                || self.render_preview(&prepared, cancel),
                || self.render_lut(&prepared, cancel),
            )
        });
        match (preview, hald) {
            (Ok(preview), Ok(hald)) => Ok(RenderedGrade { preview, hald }),
            (preview, hald) => {
                let mut err = GradeError::Cancelled;
                for result in [preview, hald] {
                    match result {
                        Ok(buf) => self.recycle(buf),
                        Err(GradeError::Cancelled) => {}
                        Err(other) => err = other,
                    }
                }
                Err(err)
            }
        }
    }

    /// Hand an output buffer's storage back for reuse.
    pub fn recycle(&self, buffer: PixelBuffer) {
        self.pool.release(buffer.into_bytes());
    }

    /// Spare buffers held by this session's pool.
    pub fn pooled_buffers(&self) -> usize {
        self.pool.available()
    }

    fn render_from(
        &self,
        src: &PixelBuffer,
        adjustments: &PreparedAdjustments,
        cancel: Option<&CancelToken>,
    ) -> Result<PixelBuffer, GradeError> {
        let exec = ExecContext {
            cancel,
            ..self.config.exec()
        };
        let mut out = self.pool.acquire(src.as_bytes().len());
        if let Err(err) = adjustments.apply_into(src, &mut out, &exec) {
            self.pool.release(out);
            return Err(err);
        }
        Ok(PixelBuffer::from_parts(src.width(), src.height(), out))
    }
}

/// Statistics of both images, then the transferred target and Hald.
fn prepare(
    reference: &PixelBuffer,
    target: &PixelBuffer,
    config: &EngineConfig,
) -> (AdvancedStats, AdvancedStats, PixelBuffer, PixelBuffer) {
    let exec = config.exec();
    let (reference_stats, target_stats) = rayon::join(
        || compute_stats_with(reference, &exec),
        || compute_stats_with(target, &exec),
    );
    tracing::debug!(
        reference_mean_l = reference_stats.global_mean_l,
        target_mean_l = target_stats.global_mean_l,
        "extracted zone statistics"
    );

    let hald = generate_hald();
    let threshold = config.parallel_threshold;
    let (base, hald_base) = rayon::join(
        || transferred(target, &reference_stats, &target_stats, threshold),
        || {
            transferred(
                &hald,
                &reference_stats,
                &AdvancedStats::NEUTRAL_EXPORT_TARGET,
                threshold,
            )
        },
    );
    (reference_stats, target_stats, base, hald_base)
}

fn transferred(
    src: &PixelBuffer,
    source_stats: &AdvancedStats,
    target_stats: &AdvancedStats,
    parallel_threshold: usize,
) -> PixelBuffer {
    let mut out = vec![0u8; src.as_bytes().len()];
    transfer_into(src, &mut out, source_stats, target_stats, parallel_threshold);
    PixelBuffer::from_parts(src.width(), src.height(), out)
}
