//! Parallel execution helpers shared by every per-pixel pass.
//!
//! Work below a pixel-count threshold runs sequentially on the calling
//! thread; above it, rows (or pixels, for reductions) are spread across the
//! current rayon pool. Each row writes only its own output slice, so no
//! locking is needed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::error::GradeError;

/// Pixel count at which passes switch from sequential to parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 65_536;

/// Cooperative cancellation handle tied to a render generation.
///
/// A token is live while the shared counter still equals the generation it
/// was issued for. Bumping the counter cancels every older token at once.
#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl CancelToken {
    pub(crate) fn new(current: Arc<AtomicU64>, generation: u64) -> Self {
        Self {
            current,
            generation,
        }
    }

    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            generation: 0,
        }
    }

    /// Generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer generation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::Acquire) != self.generation
    }

    /// `Err(Cancelled)` once superseded.
    pub fn check(&self) -> Result<(), GradeError> {
        if self.is_cancelled() {
            Err(GradeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// How a pass should run: the parallel threshold and an optional cancel token.
#[derive(Debug, Clone, Copy)]
pub struct ExecContext<'a> {
    pub parallel_threshold: usize,
    pub cancel: Option<&'a CancelToken>,
}

impl Default for ExecContext<'_> {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cancel: None,
        }
    }
}

impl<'a> ExecContext<'a> {
    pub fn with_cancel(self, cancel: &'a CancelToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self
        }
    }

    fn check(&self) -> Result<(), GradeError> {
        match self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }
}

/// Map `src` rows onto `dst` rows. Both slices must have the same length.
///
/// The cancel token, if any, is checked before each row; a cancelled pass
/// leaves `dst` partially written and returns `Err(Cancelled)`.
pub fn map_rows<F>(
    src: &[u8],
    dst: &mut [u8],
    row_len: usize,
    exec: &ExecContext<'_>,
    f: F,
) -> Result<(), GradeError>
where
    F: Fn(&[u8], &mut [u8]) + Sync,
{
    debug_assert_eq!(src.len(), dst.len());
    if row_len == 0 || src.is_empty() {
        return exec.check();
    }

    if src.len() / 4 >= exec.parallel_threshold {
        src.par_chunks(row_len)
            .zip(dst.par_chunks_mut(row_len))
            .try_for_each(|(s, d)| {
                exec.check()?;
                f(s, d);
                Ok(())
            })
    } else {
        for (s, d) in src.chunks(row_len).zip(dst.chunks_mut(row_len)) {
            exec.check()?;
            f(s, d);
        }
        Ok(())
    }
}

/// [`map_rows`] without cancellation: every row of `dst` is written.
pub fn map_all_rows<F>(
    src: &[u8],
    dst: &mut [u8],
    row_len: usize,
    parallel_threshold: usize,
    f: F,
) where
    F: Fn(&[u8], &mut [u8]) + Sync,
{
    debug_assert_eq!(src.len(), dst.len());
    if row_len == 0 {
        return;
    }
    if src.len() / 4 >= parallel_threshold {
        src.par_chunks(row_len)
            .zip(dst.par_chunks_mut(row_len))
            .for_each(|(s, d)| f(s, d));
    } else {
        for (s, d) in src.chunks(row_len).zip(dst.chunks_mut(row_len)) {
            f(s, d);
        }
    }
}

/// Fill `dst` row by row from the row index alone.
pub fn fill_rows<F>(dst: &mut [u8], row_len: usize, exec: &ExecContext<'_>, f: F)
where
    F: Fn(usize, &mut [u8]) + Sync,
{
    if row_len == 0 {
        return;
    }
    if dst.len() / 4 >= exec.parallel_threshold {
        dst.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        for (y, row) in dst.chunks_mut(row_len).enumerate() {
            f(y, row);
        }
    }
}

/// Fold/reduce over fixed-size chunks with threshold-based dispatch.
pub fn fold_chunks<A, I, F, R>(
    data: &[u8],
    chunk_size: usize,
    exec: &ExecContext<'_>,
    init: I,
    fold_fn: F,
    reduce_fn: R,
) -> A
where
    A: Send,
    I: Fn() -> A + Sync + Send,
    F: Fn(A, &[u8]) -> A + Sync + Send,
    R: Fn(A, A) -> A + Sync + Send,
{
    if data.len() / chunk_size >= exec.parallel_threshold {
        data.par_chunks_exact(chunk_size)
            .fold(&init, &fold_fn)
            .reduce(&init, &reduce_fn)
    } else {
        data.chunks_exact(chunk_size).fold(init(), fold_fn)
    }
}
