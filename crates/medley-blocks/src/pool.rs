//! Time-ordered, capacity-bounded pools of media blocks.
//!
//! A pool holds the decode-ahead window for one media kind: blocks sorted by
//! presentation start time, bounded by a count or byte budget, with the
//! oldest material evicted first. Evicted blocks keep their buffer regions
//! and cycle back through a spare list, so a steady-state playback session
//! stops allocating once the window is warm.

use crate::block::MediaBlock;
use medley_core::{defaults, MediaKind, MedleyError, Result, TimeRange, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

// ── Capacity policy ─────────────────────────────────────────────

/// How a pool bounds its resident blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityLimit {
    /// At most this many resident blocks. The incoming block is always
    /// admitted, so a zero bound keeps exactly the newest block.
    Blocks(usize),
    /// At most this many resident payload bytes. The incoming block is
    /// always admitted, even when it alone exceeds the budget.
    Bytes(usize),
}

/// Configuration for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Media kind every block in the pool must carry
    pub kind: MediaKind,
    /// Eviction bound
    pub capacity: CapacityLimit,
}

impl PoolConfig {
    pub fn new(kind: MediaKind, capacity: CapacityLimit) -> Self {
        Self { kind, capacity }
    }

    /// Default decode-ahead window for the given kind.
    pub fn default_for(kind: MediaKind) -> Self {
        let capacity = CapacityLimit::Blocks(match kind {
            MediaKind::Video => defaults::VIDEO_BLOCKS,
            MediaKind::Audio => defaults::AUDIO_BLOCKS,
            MediaKind::Subtitle => defaults::SUBTITLE_BLOCKS,
        });
        Self { kind, capacity }
    }
}

// ── Retrieval result ────────────────────────────────────────────

/// Outcome of a point-in-time query.
#[derive(Debug)]
pub enum Retrieved<'a> {
    /// The latest block whose start time does not exceed the query time.
    ///
    /// This is an exact cover when the query falls inside the block's
    /// interval, and the nearest-past block otherwise; `covers` on the
    /// block tells the two apart.
    Block(&'a MediaBlock),
    /// The query time precedes the earliest resident block
    BeforeStart,
    /// No blocks are resident
    Empty,
}

impl<'a> Retrieved<'a> {
    /// The found block, if any.
    pub fn block(self) -> Option<&'a MediaBlock> {
        match self {
            Self::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Whether a block was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}

// ── Pool ────────────────────────────────────────────────────────

/// Ordered, capacity-bounded collection of blocks of one media kind.
///
/// The pool is the sole owner of index order. Callers read blocks through
/// the query methods and feed new material through `acquire`/`add`; a block
/// handed out by `acquire` is outside the pool until `add` or `release`
/// brings it back.
#[derive(Debug)]
pub struct BlockPool {
    config: PoolConfig,
    /// Resident blocks in ascending start-time order
    blocks: Vec<MediaBlock>,
    /// Recycled shells awaiting their next payload
    spares: Vec<MediaBlock>,
    /// Sum of resident payload lengths
    resident_bytes: usize,
}

impl BlockPool {
    /// New pool under the given configuration.
    ///
    /// A block-count bound preallocates that many empty shells up front;
    /// their buffers grow on first load and are retained through recycling.
    /// A byte budget starts with no shells and accumulates them as blocks
    /// are evicted.
    pub fn new(config: PoolConfig) -> Self {
        let spares = match config.capacity {
            CapacityLimit::Blocks(count) => {
                (0..count).map(|_| MediaBlock::new(config.kind)).collect()
            }
            CapacityLimit::Bytes(_) => Vec::new(),
        };
        Self {
            config,
            blocks: Vec::new(),
            spares,
            resident_bytes: 0,
        }
    }

    /// New pool with the default window for the given kind.
    pub fn with_defaults(kind: MediaKind) -> Self {
        Self::new(PoolConfig::default_for(kind))
    }

    /// This pool's configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Media kind of every block in this pool.
    pub fn kind(&self) -> MediaKind {
        self.config.kind
    }

    // ── Block lifecycle ─────────────────────────────────────────

    /// Take a spare shell, or create a fresh empty block of the pool's kind.
    pub fn acquire(&mut self) -> MediaBlock {
        self.spares
            .pop()
            .unwrap_or_else(|| MediaBlock::new(self.config.kind))
    }

    /// Return an acquired block without adding it, keeping it as a spare.
    pub fn release(&mut self, mut block: MediaBlock) {
        if block.kind() != self.config.kind {
            warn!(
                expected = %self.config.kind,
                found = %block.kind(),
                "dropping released block of mismatched kind"
            );
            return;
        }
        block.deallocate();
        self.spares.push(block);
    }

    /// Insert a loaded block in start-time order, evicting the oldest
    /// resident material first if the capacity bound requires it.
    ///
    /// A block sharing a start time with a resident block replaces it, and
    /// the replaced block is recycled. Out-of-order start times are accepted
    /// and sorted into place. The incoming block itself is always admitted,
    /// even when it alone exceeds a byte budget.
    pub fn add(&mut self, block: MediaBlock) -> Result<()> {
        if block.kind() != self.config.kind {
            return Err(MedleyError::KindMismatch {
                expected: self.config.kind,
                found: block.kind(),
            });
        }
        if block.duration().is_negative() {
            return Err(MedleyError::NegativeDuration(block.duration()));
        }
        if !block.is_loaded() {
            return Err(MedleyError::BlockIncomplete(block.kind()));
        }

        let start = block.start_time();

        // Same start time means replacement: retire the resident block and
        // run the normal admission path for the newcomer.
        if let Ok(pos) = self
            .blocks
            .binary_search_by(|resident| resident.start_time().cmp(&start))
        {
            let old = self.blocks.remove(pos);
            debug!(kind = %self.config.kind, start = %start, "replacing resident block");
            self.retire(old);
        }

        self.make_room_for(&block);

        let pos = self
            .blocks
            .partition_point(|resident| resident.start_time() < start);
        trace!(kind = %self.config.kind, start = %start, pos, "inserting block");
        self.resident_bytes += block.buffer_len();
        self.blocks.insert(pos, block);
        Ok(())
    }

    /// Evict the block with the given start time. Returns whether one was
    /// resident.
    pub fn evict(&mut self, start: Timestamp) -> bool {
        match self
            .blocks
            .binary_search_by(|resident| resident.start_time().cmp(&start))
        {
            Ok(pos) => {
                let old = self.blocks.remove(pos);
                debug!(kind = %self.config.kind, start = %start, "evicting block");
                self.retire(old);
                true
            }
            Err(_) => false,
        }
    }

    /// Evict the oldest resident block. Returns whether one was resident.
    pub fn evict_oldest(&mut self) -> bool {
        if self.blocks.is_empty() {
            return false;
        }
        let old = self.blocks.remove(0);
        debug!(kind = %self.config.kind, start = %old.start_time(), "evicting oldest block");
        self.retire(old);
        true
    }

    /// Evict every resident block, recycling them all.
    pub fn clear(&mut self) {
        debug!(kind = %self.config.kind, count = self.blocks.len(), "clearing pool");
        while let Some(mut block) = self.blocks.pop() {
            block.deallocate();
            self.spares.push(block);
        }
        self.resident_bytes = 0;
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Find the block for a presentation time.
    ///
    /// Nearest-past semantics: the result is the latest block whose start
    /// time does not exceed `time`, whether or not its interval covers it.
    pub fn retrieve_at(&self, time: Timestamp) -> Retrieved<'_> {
        if self.blocks.is_empty() {
            return Retrieved::Empty;
        }
        let idx = self
            .blocks
            .partition_point(|resident| resident.start_time() <= time);
        if idx == 0 {
            return Retrieved::BeforeStart;
        }
        Retrieved::Block(&self.blocks[idx - 1])
    }

    /// The contiguous run of resident blocks overlapping a time range.
    pub fn range_blocks(&self, range: TimeRange) -> &[MediaBlock] {
        let from = self
            .blocks
            .partition_point(|resident| resident.end_time() <= range.start);
        let to = self
            .blocks
            .partition_point(|resident| resident.start_time() < range.end());
        &self.blocks[from.min(to)..to]
    }

    /// Resident blocks in start-time order.
    pub fn blocks(&self) -> &[MediaBlock] {
        &self.blocks
    }

    // ── Stats ───────────────────────────────────────────────────

    /// Number of resident blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks are resident.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether the capacity bound leaves no room for another block.
    pub fn is_full(&self) -> bool {
        match self.config.capacity {
            CapacityLimit::Blocks(max) => self.blocks.len() >= max,
            CapacityLimit::Bytes(budget) => self.resident_bytes >= budget,
        }
    }

    /// Sum of resident payload lengths in bytes.
    pub fn resident_bytes(&self) -> usize {
        self.resident_bytes
    }

    /// Start time of the earliest resident block.
    pub fn range_start(&self) -> Option<Timestamp> {
        self.blocks.first().map(MediaBlock::start_time)
    }

    /// End time of the latest resident block.
    pub fn range_end(&self) -> Option<Timestamp> {
        self.blocks.last().map(MediaBlock::end_time)
    }

    /// Span covered by resident blocks, earliest start to latest end.
    pub fn range_duration(&self) -> Option<Timestamp> {
        match (self.range_start(), self.range_end()) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Whether a time falls inside the resident span.
    pub fn is_in_range(&self, time: Timestamp) -> bool {
        match (self.range_start(), self.range_end()) {
            (Some(start), Some(end)) => time >= start && time < end,
            _ => false,
        }
    }

    /// Resident fill as a fraction of the capacity bound. Can exceed 1.0
    /// when a single block is larger than the whole byte budget.
    pub fn fill_ratio(&self) -> f64 {
        let (used, cap) = match self.config.capacity {
            CapacityLimit::Blocks(max) => (self.blocks.len() as f64, max as f64),
            CapacityLimit::Bytes(budget) => (self.resident_bytes as f64, budget as f64),
        };
        if cap <= 0.0 {
            return if used > 0.0 { 1.0 } else { 0.0 };
        }
        used / cap
    }

    /// Number of recycled shells waiting for their next payload.
    pub fn spare_count(&self) -> usize {
        self.spares.len()
    }

    // ── Internals ───────────────────────────────────────────────

    /// Evict the oldest resident blocks until the capacity bound can take
    /// the incoming block.
    fn make_room_for(&mut self, incoming: &MediaBlock) {
        match self.config.capacity {
            CapacityLimit::Blocks(max) => {
                while !self.blocks.is_empty() && self.blocks.len() + 1 > max {
                    self.evict_oldest();
                }
            }
            CapacityLimit::Bytes(budget) => {
                let incoming_len = incoming.buffer_len();
                if incoming_len > budget {
                    warn!(
                        kind = %self.config.kind,
                        bytes = incoming_len,
                        budget,
                        "single block exceeds the pool byte budget"
                    );
                }
                while !self.blocks.is_empty() && self.resident_bytes + incoming_len > budget {
                    self.evict_oldest();
                }
            }
        }
    }

    /// Take a removed block out of the byte accounting and recycle it.
    fn retire(&mut self, mut block: MediaBlock) {
        self.resident_bytes -= block.buffer_len();
        block.deallocate();
        self.spares.push(block);
    }
}

// ── Shared handle ───────────────────────────────────────────────

/// Clonable handle to a pool shared between a producer and a consumer.
///
/// One lock guards one pool; separate pools for separate media kinds share
/// nothing. Access is closure-scoped so each lock hold spans exactly one
/// structural operation.
#[derive(Debug, Clone)]
pub struct SharedBlockPool {
    inner: Arc<Mutex<BlockPool>>,
}

impl SharedBlockPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BlockPool::new(config))),
        }
    }

    pub fn with_defaults(kind: MediaKind) -> Self {
        Self::new(PoolConfig::default_for(kind))
    }

    /// Run a read-only operation under the pool lock.
    pub fn with<R>(&self, f: impl FnOnce(&BlockPool) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run a mutating operation under the pool lock.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut BlockPool) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
