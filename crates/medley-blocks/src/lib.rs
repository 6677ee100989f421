//! Medley Blocks - Preallocated, time-indexed media block pools
//!
//! The decode-ahead window of a playback engine. Decoded units live in
//! reusable buffers indexed by presentation time; a capacity policy evicts
//! the oldest material, and evicted buffers are recycled rather than freed.
//!
//! Architecture:
//! - `BlockBuffer`: reusable byte region with capacity/used-length split
//! - `MediaBlock`: one decoded unit (video, audio, or subtitle payload)
//! - `BlockPool`: start-time ordered window with oldest-first eviction
//! - `SharedBlockPool`: lock-guarded handle for producer/consumer use
//! - Frame descriptors carry layout and timing in from the decoder

pub mod alloc;
pub mod block;
pub mod captions;
pub mod format;
pub mod frame;
pub mod pool;

pub use alloc::BlockBuffer;
pub use block::{AudioLayout, BlockPayload, MediaBlock, SubtitleLayout, VideoLayout};
pub use captions::ClosedCaptionPacket;
pub use format::{PixelFormat, SampleFormat};
pub use frame::{AudioFrame, SubtitleFrame, VideoFrame};
pub use pool::{BlockPool, CapacityLimit, PoolConfig, Retrieved, SharedBlockPool};
