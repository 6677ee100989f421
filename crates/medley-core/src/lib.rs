//! Medley Core - Foundation types for media block buffering
//!
//! This crate provides the fundamental types used throughout Medley:
//! - Time representation (Timestamp, TimeRange)
//! - The media kind discriminator
//! - Error types

pub mod error;
pub mod media;
pub mod time;

pub use error::{MedleyError, Result};
pub use media::MediaKind;
pub use time::{TimeRange, Timestamp};

/// Default decode-ahead window sizes per media kind.
///
/// Pools hold roughly one second of video, a couple of seconds of short
/// audio sample runs, and a handful of long-lived subtitle cues.
pub mod defaults {
    /// Resident video pictures (one second at typical frame rates)
    pub const VIDEO_BLOCKS: usize = 25;

    /// Resident audio sample runs (~2.4 s of 20 ms frames)
    pub const AUDIO_BLOCKS: usize = 120;

    /// Resident subtitle cue sets
    pub const SUBTITLE_BLOCKS: usize = 12;
}
