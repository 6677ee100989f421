//! Reusable byte buffers for block payloads.
//!
//! Avoids allocating per decoded frame by keeping each block's region alive
//! across refills: a new payload that fits the existing region reuses it
//! without touching the allocator, which is the common case for a
//! constant-resolution stream.

use medley_core::{MedleyError, Result};

/// The exclusively owned byte region of one block.
///
/// Tracks region capacity and used length separately. `allocate` grows the
/// region only when the target exceeds the current capacity; `reset` drops
/// the used length to zero and keeps the region for the next payload. The
/// region itself is freed exactly once, when the buffer is dropped.
#[derive(Debug, Default)]
pub struct BlockBuffer {
    /// Allocated region; its length is the region capacity
    region: Vec<u8>,
    /// Bytes of the region holding current payload
    used: usize,
}

impl BlockBuffer {
    /// New buffer with no region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the buffer hold exactly `target_len` payload bytes.
    ///
    /// If the current region is at least that large it is reused as-is,
    /// stale contents included. Otherwise the old region is released and a
    /// fresh zero-filled region of exactly `target_len` bytes is acquired.
    /// Allocation failure leaves the buffer empty rather than partially
    /// resized.
    pub fn allocate(&mut self, target_len: usize) -> Result<()> {
        if target_len <= self.region.len() {
            self.used = target_len;
            return Ok(());
        }

        // Release before acquire so peak usage stays at one region.
        self.region = Vec::new();
        self.used = 0;

        let mut fresh: Vec<u8> = Vec::new();
        fresh
            .try_reserve_exact(target_len)
            .map_err(|source| MedleyError::Allocation {
                requested: target_len,
                source,
            })?;
        fresh.resize(target_len, 0);

        self.region = fresh;
        self.used = target_len;
        Ok(())
    }

    /// Drop the used length to zero, retaining the region for reuse.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Payload bytes currently in use.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.region[..self.used]
    }

    /// Mutable view of the payload bytes currently in use.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.region[..self.used]
    }

    /// Used payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.used
    }

    /// Whether no payload bytes are in use.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Size of the allocated region in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.len()
    }
}
