//! Media blocks: one decoded, timestamped unit with an owned reusable buffer.
//!
//! A block is created empty for one media kind, filled from a decoder frame
//! descriptor, queried while pool-resident, and recycled on eviction. The
//! payload layouts differ per kind; the lifecycle contract does not.

use crate::alloc::BlockBuffer;
use crate::captions::ClosedCaptionPacket;
use crate::format::{PixelFormat, SampleFormat};
use crate::frame::{AudioFrame, SubtitleFrame, VideoFrame};
use medley_core::{MediaKind, MedleyError, Result, TimeRange, Timestamp};
use smallvec::SmallVec;
use std::ops::Range;

/// Picture geometry and side data of a loaded video block.
#[derive(Debug, Clone, Default)]
pub struct VideoLayout {
    /// Picture width in pixels
    pub pixel_width: u32,
    /// Picture height in pixels
    pub pixel_height: u32,
    /// Bytes per row of the primary plane
    pub stride: usize,
    /// Pixel format the buffer holds
    pub format: PixelFormat,
    /// Display aspect ratio numerator, decoder-supplied
    pub aspect_width: u32,
    /// Display aspect ratio denominator, decoder-supplied
    pub aspect_height: u32,
    /// Picture number in presentation order
    pub display_picture_number: i64,
    /// Picture number in decode order
    pub coded_picture_number: i64,
    /// SMPTE timecode string, when the stream carries one
    pub timecode: Option<String>,
    closed_captions: SmallVec<[ClosedCaptionPacket; 4]>,
}

impl VideoLayout {
    /// Caption packets attached to this picture, in timestamp order.
    #[inline]
    pub fn closed_captions(&self) -> &[ClosedCaptionPacket] {
        &self.closed_captions
    }
}

/// Sample geometry of a loaded audio block.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioLayout {
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channel_count: u16,
    /// Sample count per channel
    pub samples_per_channel: usize,
    /// Sample format the buffer holds
    pub format: SampleFormat,
}

/// Cue line index of a loaded subtitle block.
///
/// The text itself lives in the block's byte buffer; each span addresses one
/// UTF-8 line within it.
#[derive(Debug, Clone, Default)]
pub struct SubtitleLayout {
    spans: SmallVec<[Range<usize>; 4]>,
}

impl SubtitleLayout {
    /// Number of cue lines.
    #[inline]
    pub fn cue_count(&self) -> usize {
        self.spans.len()
    }
}

/// Kind-specific payload description, dispatched on the kind tag.
#[derive(Debug, Clone)]
pub enum BlockPayload {
    Video(VideoLayout),
    Audio(AudioLayout),
    Subtitle(SubtitleLayout),
}

impl BlockPayload {
    /// Media kind this payload belongs to.
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Video(_) => MediaKind::Video,
            Self::Audio(_) => MediaKind::Audio,
            Self::Subtitle(_) => MediaKind::Subtitle,
        }
    }

    fn empty(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Video => Self::Video(VideoLayout::default()),
            MediaKind::Audio => Self::Audio(AudioLayout::default()),
            MediaKind::Subtitle => Self::Subtitle(SubtitleLayout::default()),
        }
    }
}

/// One decoded media unit with presentation timing and an owned buffer.
///
/// The buffer region is freed exactly once, when the block is dropped;
/// `deallocate` only clears payload state and keeps the region for reuse.
#[derive(Debug)]
pub struct MediaBlock {
    start_time: Timestamp,
    duration: Timestamp,
    buffer: BlockBuffer,
    payload: BlockPayload,
}

impl MediaBlock {
    /// An empty block of the given kind, with no buffer yet.
    pub fn new(kind: MediaKind) -> Self {
        Self {
            start_time: Timestamp::ZERO,
            duration: Timestamp::ZERO,
            buffer: BlockBuffer::new(),
            payload: BlockPayload::empty(kind),
        }
    }

    /// Media kind of this block, fixed at creation.
    #[inline]
    pub fn kind(&self) -> MediaKind {
        self.payload.kind()
    }

    /// Presentation start time.
    #[inline]
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Presentation duration.
    #[inline]
    pub fn duration(&self) -> Timestamp {
        self.duration
    }

    /// Presentation end time (exclusive).
    #[inline]
    pub fn end_time(&self) -> Timestamp {
        self.start_time + self.duration
    }

    /// Presentation interval `[start, end)`.
    #[inline]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }

    /// Whether `time` falls inside this block's presentation interval.
    #[inline]
    pub fn covers(&self, time: Timestamp) -> bool {
        self.range().contains(time)
    }

    /// Kind-specific payload description.
    #[inline]
    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    /// Video layout, if this is a video block.
    pub fn as_video(&self) -> Option<&VideoLayout> {
        match &self.payload {
            BlockPayload::Video(layout) => Some(layout),
            _ => None,
        }
    }

    /// Audio layout, if this is an audio block.
    pub fn as_audio(&self) -> Option<&AudioLayout> {
        match &self.payload {
            BlockPayload::Audio(layout) => Some(layout),
            _ => None,
        }
    }

    /// Subtitle layout, if this is a subtitle block.
    pub fn as_subtitle(&self) -> Option<&SubtitleLayout> {
        match &self.payload {
            BlockPayload::Subtitle(layout) => Some(layout),
            _ => None,
        }
    }

    /// Size the buffer to hold exactly `target_len` payload bytes.
    ///
    /// Low-level path: reuses the existing region when it is large enough,
    /// otherwise swaps in a fresh zero-filled one. The `load_*` methods call
    /// this and additionally keep the payload layout consistent.
    pub fn allocate(&mut self, target_len: usize) -> Result<()> {
        self.buffer.allocate(target_len)
    }

    /// Size the buffer for one picture and record its layout and side data.
    ///
    /// After this returns the buffer holds room for a full `width x height`
    /// image in `format`; the caller copies or converts pixel data in through
    /// `picture_mut`.
    pub fn load_video(&mut self, frame: &VideoFrame, format: PixelFormat) -> Result<()> {
        self.expect_kind(MediaKind::Video)?;
        if frame.duration.is_negative() {
            return Err(MedleyError::NegativeDuration(frame.duration));
        }
        let target_len = format.buffer_size(frame.width, frame.height)?;
        self.buffer.allocate(target_len)?;

        self.start_time = frame.start_time;
        self.duration = frame.duration;

        // Decoders that do not number pictures get the start-time quotient.
        let display_picture_number = frame
            .display_picture_number
            .unwrap_or_else(|| frame.start_time.checked_div(frame.duration).unwrap_or(0));

        let mut closed_captions = frame.closed_captions.clone();
        closed_captions.sort();

        self.payload = BlockPayload::Video(VideoLayout {
            pixel_width: frame.width,
            pixel_height: frame.height,
            stride: format.line_size(frame.width),
            format,
            aspect_width: frame.aspect_width,
            aspect_height: frame.aspect_height,
            display_picture_number,
            coded_picture_number: frame.coded_picture_number,
            timecode: frame.timecode.clone(),
            closed_captions,
        });
        Ok(())
    }

    /// Size the buffer for one run of interleaved samples and record the
    /// layout. Sample bytes are copied in through `samples_mut`.
    pub fn load_audio(&mut self, frame: &AudioFrame, format: SampleFormat) -> Result<()> {
        self.expect_kind(MediaKind::Audio)?;
        if frame.duration.is_negative() {
            return Err(MedleyError::NegativeDuration(frame.duration));
        }
        let target_len = format.buffer_size(frame.samples_per_channel, frame.channel_count)?;
        self.buffer.allocate(target_len)?;

        self.start_time = frame.start_time;
        self.duration = frame.duration;
        self.payload = BlockPayload::Audio(AudioLayout {
            sample_rate: frame.sample_rate,
            channel_count: frame.channel_count,
            samples_per_channel: frame.samples_per_channel,
            format,
        });
        Ok(())
    }

    /// Size the buffer to the cue text and copy it in.
    ///
    /// Text content and descriptor are the same thing, so unlike the video
    /// and audio paths there is no second copy step.
    pub fn load_subtitle(&mut self, frame: &SubtitleFrame) -> Result<()> {
        self.expect_kind(MediaKind::Subtitle)?;
        if frame.duration.is_negative() {
            return Err(MedleyError::NegativeDuration(frame.duration));
        }
        self.buffer.allocate(frame.text_len())?;

        let mut spans: SmallVec<[Range<usize>; 4]> = SmallVec::new();
        let mut offset = 0;
        let dest = self.buffer.as_mut_slice();
        for line in &frame.lines {
            let end = offset + line.len();
            dest[offset..end].copy_from_slice(line.as_bytes());
            spans.push(offset..end);
            offset = end;
        }

        self.start_time = frame.start_time;
        self.duration = frame.duration;
        self.payload = BlockPayload::Subtitle(SubtitleLayout { spans });
        Ok(())
    }

    /// Clear payload state and mark the buffer reusable.
    ///
    /// Size-describing fields drop to zero and the used length to empty; the
    /// buffer region is retained so the next load can reuse it. Safe to call
    /// repeatedly, and harmless on a block that was never loaded.
    pub fn deallocate(&mut self) {
        self.buffer.reset();
        self.start_time = Timestamp::ZERO;
        self.duration = Timestamp::ZERO;
        self.payload = BlockPayload::empty(self.kind());
    }

    /// Whether the buffer matches the declared payload layout.
    ///
    /// Pools check this on admission so a partially prepared block never
    /// becomes resident.
    pub fn is_loaded(&self) -> bool {
        match &self.payload {
            BlockPayload::Video(v) => {
                v.pixel_width > 0
                    && v.pixel_height > 0
                    && v.format
                        .buffer_size(v.pixel_width, v.pixel_height)
                        .is_ok_and(|need| need == self.buffer.len())
            }
            BlockPayload::Audio(a) => {
                a.samples_per_channel > 0
                    && a.format
                        .buffer_size(a.samples_per_channel, a.channel_count)
                        .is_ok_and(|need| need == self.buffer.len())
            }
            BlockPayload::Subtitle(s) => {
                !s.spans.is_empty() && s.spans.iter().all(|span| span.end <= self.buffer.len())
            }
        }
    }

    /// Read-only view of the payload bytes.
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Used payload length in bytes.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Allocated region size in bytes, which reuse retains across loads.
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Writable picture bytes, for video blocks only.
    pub fn picture_mut(&mut self) -> Option<&mut [u8]> {
        matches!(self.payload, BlockPayload::Video(_)).then(|| self.buffer.as_mut_slice())
    }

    /// Writable sample bytes, for audio blocks only.
    pub fn samples_mut(&mut self) -> Option<&mut [u8]> {
        matches!(self.payload, BlockPayload::Audio(_)).then(|| self.buffer.as_mut_slice())
    }

    /// One cue line of a subtitle block.
    pub fn cue(&self, index: usize) -> Option<&str> {
        let BlockPayload::Subtitle(layout) = &self.payload else {
            return None;
        };
        let span = layout.spans.get(index)?.clone();
        let bytes = self.buffer.as_slice().get(span)?;
        std::str::from_utf8(bytes).ok()
    }

    /// Number of cue lines in a subtitle block, 0 for other kinds.
    pub fn cue_count(&self) -> usize {
        match &self.payload {
            BlockPayload::Subtitle(layout) => layout.cue_count(),
            _ => 0,
        }
    }

    /// Cue lines of a subtitle block in order.
    pub fn cues(&self) -> impl Iterator<Item = &str> {
        (0..self.cue_count()).filter_map(move |i| self.cue(i))
    }

    fn expect_kind(&self, expected: MediaKind) -> Result<()> {
        let found = self.kind();
        if found == expected {
            Ok(())
        } else {
            Err(MedleyError::KindMismatch { expected, found })
        }
    }
}
