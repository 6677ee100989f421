//! Decoded frame descriptors handed over by the decoding collaborator.
//!
//! These carry the layout and timing a block needs to size its buffer and
//! index itself; the pixel or sample bytes themselves are copied into the
//! block afterwards by the caller.

use crate::captions::ClosedCaptionPacket;
use medley_core::{TimeRange, Timestamp};
use smallvec::SmallVec;

/// Describes one decoded picture.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Picture width in pixels
    pub width: u32,
    /// Picture height in pixels
    pub height: u32,
    /// Presentation start time
    pub start_time: Timestamp,
    /// Presentation duration
    pub duration: Timestamp,
    /// Display aspect ratio numerator
    pub aspect_width: u32,
    /// Display aspect ratio denominator
    pub aspect_height: u32,
    /// Picture number in presentation order, when the decoder supplies one
    pub display_picture_number: Option<i64>,
    /// Picture number in decode order
    pub coded_picture_number: i64,
    /// SMPTE timecode string, when the stream carries one
    pub timecode: Option<String>,
    /// Caption packets attached to this picture
    pub closed_captions: SmallVec<[ClosedCaptionPacket; 4]>,
}

impl VideoFrame {
    /// Descriptor with square pixels and no side data.
    pub fn new(width: u32, height: u32, start_time: Timestamp, duration: Timestamp) -> Self {
        Self {
            width,
            height,
            start_time,
            duration,
            aspect_width: 1,
            aspect_height: 1,
            display_picture_number: None,
            coded_picture_number: 0,
            timecode: None,
            closed_captions: SmallVec::new(),
        }
    }

    /// Presentation interval of this picture.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }
}

/// Describes one run of decoded interleaved PCM.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channel_count: u16,
    /// Sample count per channel in this frame
    pub samples_per_channel: usize,
    /// Presentation start time
    pub start_time: Timestamp,
    /// Presentation duration
    pub duration: Timestamp,
}

impl AudioFrame {
    pub fn new(
        sample_rate: u32,
        channel_count: u16,
        samples_per_channel: usize,
        start_time: Timestamp,
    ) -> Self {
        // Duration follows from the sample count unless the caller overrides it.
        let duration = if sample_rate == 0 {
            Timestamp::ZERO
        } else {
            Timestamp::new(samples_per_channel as i64, sample_rate as i64)
        };
        Self {
            sample_rate,
            channel_count,
            samples_per_channel,
            start_time,
            duration,
        }
    }

    /// Presentation interval of this frame.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }
}

/// Describes one decoded subtitle cue.
#[derive(Debug, Clone)]
pub struct SubtitleFrame {
    /// Cue text, one entry per rendered line
    pub lines: Vec<String>,
    /// Presentation start time
    pub start_time: Timestamp,
    /// Presentation duration
    pub duration: Timestamp,
}

impl SubtitleFrame {
    pub fn new(lines: Vec<String>, start_time: Timestamp, duration: Timestamp) -> Self {
        Self {
            lines,
            start_time,
            duration,
        }
    }

    /// Total UTF-8 bytes across all cue lines.
    pub fn text_len(&self) -> usize {
        self.lines.iter().map(String::len).sum()
    }

    /// Presentation interval of this cue.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }
}
