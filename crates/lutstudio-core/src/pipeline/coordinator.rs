//! Latest-wins regrade scheduling.
//!
//! Every [`Regrader::submit`] bumps a shared generation counter and queues a
//! render on the worker pool. A render checks its [`CancelToken`] before each
//! row, so once a newer snapshot is submitted the older one abandons at the
//! next row boundary. Results come back over a channel tagged with their
//! generation; anything older than the newest submission is discarded and
//! its storage recycled, so a stale result can never overwrite a fresh one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::error::GradeError;
use crate::parallel::CancelToken;
use crate::pipeline::session::{GradingSession, RenderedGrade};
use crate::transform::params::ColorAdjustments;

/// A finished (or abandoned) render tagged with its generation.
#[derive(Debug)]
struct RenderMessage {
    generation: u64,
    outcome: Result<RenderedGrade, GradeError>,
}

/// Runs regrades in the background and hands back only the newest result.
pub struct Regrader {
    session: Arc<GradingSession>,
    workers: Arc<rayon::ThreadPool>,
    generation: Arc<AtomicU64>,
    delivered: u64,
    results_tx: mpsc::UnboundedSender<RenderMessage>,
    results_rx: mpsc::UnboundedReceiver<RenderMessage>,
}

impl Regrader {
    /// Wrap a prepared session; regrades run on the session's worker pool.
    pub fn new(session: GradingSession) -> Self {
        let workers = Arc::clone(session.workers());
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            session: Arc::new(session),
            workers,
            generation: Arc::new(AtomicU64::new(0)),
            delivered: 0,
            results_tx,
            results_rx,
        }
    }

    pub fn session(&self) -> &GradingSession {
        &self.session
    }

    /// Generation of the newest submission.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Queue a render of `adjustments`, superseding any in-flight render.
    pub fn submit(&self, adjustments: ColorAdjustments) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let token = CancelToken::new(Arc::clone(&self.generation), generation);
        let session = Arc::clone(&self.session);
        let tx = self.results_tx.clone();

        self.workers.spawn(move || {
            // A burst of submissions collapses to the last one here.
            let outcome = match token.check() {
                Ok(()) => session.render(&adjustments, Some(&token)),
                Err(err) => Err(err),
            };
            let message = RenderMessage {
                generation,
                outcome,
            };
            if tx.send(message).is_err() {
                tracing::debug!(generation, "regrader dropped before render finished");
            }
        });
        tracing::debug!(generation, "submitted regrade");
        generation
    }

    /// The newest result if it has arrived, without blocking.
    pub fn try_latest(&mut self) -> Option<RenderedGrade> {
        let mut latest = None;
        while let Ok(msg) = self.results_rx.try_recv() {
            if let Some(grade) = self.accept(msg) {
                latest = Some(grade);
            }
        }
        latest
    }

    /// Block until the newest submission finishes.
    ///
    /// Returns `None` when nothing newer than the last delivered result is
    /// outstanding. Must not be called from inside an async runtime.
    pub fn wait_latest(&mut self) -> Option<RenderedGrade> {
        while self.delivered < self.current_generation() {
            let msg = self.results_rx.blocking_recv()?;
            if let Some(grade) = self.accept(msg) {
                return Some(grade);
            }
        }
        None
    }

    fn accept(&mut self, msg: RenderMessage) -> Option<RenderedGrade> {
        let current = self.current_generation();
        match msg.outcome {
            Ok(grade) if msg.generation == current => {
                self.delivered = msg.generation;
                Some(grade)
            }
            Ok(grade) => {
                tracing::debug!(generation = msg.generation, current, "dropping stale regrade");
                self.session.recycle(grade.preview);
                self.session.recycle(grade.hald);
                None
            }
            Err(GradeError::Cancelled) => {
                tracing::debug!(generation = msg.generation, "regrade cancelled");
                None
            }
            Err(err) => {
                tracing::warn!(generation = msg.generation, error = %err, "regrade failed");
                if msg.generation == current {
                    self.delivered = msg.generation;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::image::PixelBuffer;

    fn regrader() -> Regrader {
        let reference = PixelBuffer::filled(16, 16, [180, 120, 80, 255]);
        let target = PixelBuffer::filled(16, 16, [90, 110, 140, 255]);
        let config = EngineConfig {
            worker_threads: 2,
            parallel_threshold: 1024,
            pool_capacity: 8,
        };
        let session = GradingSession::with_config(&reference, &target, config).unwrap();
        Regrader::new(session)
    }

    #[test]
    fn test_latest_submission_wins() {
        let mut regrader = regrader();
        let mut last = ColorAdjustments::default();
        for step in 1..=5 {
            last.brightness = step as f32 * 10.0;
            regrader.submit(last.clone());
        }
        assert_eq!(regrader.current_generation(), 5);

        let grade = regrader.wait_latest().unwrap();
        let expected = regrader.session().render(&last, None).unwrap();
        assert_eq!(grade, expected);
        assert!(regrader.wait_latest().is_none());
    }

    #[test]
    fn test_try_latest_before_submit_is_empty() {
        let mut regrader = regrader();
        assert!(regrader.try_latest().is_none());
        assert!(regrader.wait_latest().is_none());
    }

    #[test]
    fn test_resubmit_after_delivery() {
        let mut regrader = regrader();
        regrader.submit(ColorAdjustments::default());
        let first = regrader.wait_latest().unwrap();

        regrader.submit(ColorAdjustments {
            saturation: -100.0,
            ..Default::default()
        });
        let second = regrader.wait_latest().unwrap();
        assert_ne!(first.preview, second.preview);
        let px = second.preview.pixel(0, 0).unwrap();
        assert!(px[0].abs_diff(px[1]) <= 1 && px[1].abs_diff(px[2]) <= 1);
    }
}
