//! Reusable output buffers.
//!
//! Every regrade produces two full-size RGBA8 buffers. Superseded and
//! consumed results hand their storage back here so the next render does
//! not allocate.

use parking_lot::Mutex;

/// A bounded free list of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

impl BufferPool {
    /// A pool that keeps at most `capacity` spare buffers.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// A zeroed buffer of exactly `len` bytes, reusing a spare if one fits.
    pub fn acquire(&self, len: usize) -> Vec<u8> {
        let reused = {
            let mut free = self.free.lock();
            free.iter()
                .position(|buf| buf.capacity() >= len)
                .map(|idx| free.swap_remove(idx))
        };
        match reused {
            Some(mut buf) => {
                buf.clear();
                buf.resize(len, 0);
                buf
            }
            None => vec![0u8; len],
        }
    }

    /// Return storage to the pool. Dropped when the pool is full.
    pub fn release(&self, buf: Vec<u8>) {
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(buf);
        }
    }

    /// Spare buffers currently held.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }
}
