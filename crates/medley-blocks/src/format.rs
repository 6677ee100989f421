//! Payload sizing rules for block buffers.
//!
//! These are the image- and sample-buffer size formulas the allocator works
//! from, with row alignment fixed at 1 byte. All arithmetic is checked: a
//! malformed frame descriptor surfaces as an error before any buffer work.

use medley_core::{MedleyError, Result};
use serde::{Deserialize, Serialize};

/// Pixel format of a decoded picture held by a video block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 24-bit BGR, the default output format for scaled pictures
    #[default]
    Bgr24,
    /// 32-bit RGBA
    Rgba8,
    /// 8-bit grayscale
    Gray8,
    /// YUV 4:2:0 planar
    Yuv420p,
}

impl PixelFormat {
    /// Bytes per pixel for packed formats, or 0 for planar.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgr24 => 3,
            Self::Rgba8 => 4,
            Self::Gray8 => 1,
            Self::Yuv420p => 0, // Planar
        }
    }

    /// Bytes per row of the primary plane, at 1-byte row alignment.
    ///
    /// For packed formats this is the picture buffer stride; planar frames
    /// report the luma plane width.
    pub fn line_size(self, width: u32) -> usize {
        match self {
            Self::Bgr24 | Self::Rgba8 | Self::Gray8 => width as usize * self.bytes_per_pixel(),
            Self::Yuv420p => width as usize,
        }
    }

    /// Total bytes needed for one `width x height` image in this format.
    ///
    /// Rejects zero dimensions and sizes that overflow addressable memory.
    pub fn buffer_size(self, width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(MedleyError::InvalidLayout(format!(
                "zero-dimension {width}x{height} picture"
            )));
        }
        let w = width as u64;
        let h = height as u64;
        let total = match self {
            Self::Bgr24 | Self::Rgba8 | Self::Gray8 => {
                w.checked_mul(h)
                    .and_then(|px| px.checked_mul(self.bytes_per_pixel() as u64))
            }
            Self::Yuv420p => {
                // Luma plane plus two quarter-size chroma planes; chroma
                // dimensions round up for odd picture sizes.
                let luma = w.checked_mul(h);
                let chroma = ((w + 1) / 2).checked_mul((h + 1) / 2);
                match (luma, chroma) {
                    (Some(l), Some(c)) => c.checked_mul(2).and_then(|c2| l.checked_add(c2)),
                    _ => None,
                }
            }
        };
        total
            .and_then(|t| usize::try_from(t).ok())
            .ok_or_else(|| {
                MedleyError::InvalidLayout(format!("{width}x{height} {self:?} picture overflows"))
            })
    }
}

/// Sample format of the interleaved PCM held by an audio block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Signed 16-bit integer samples
    #[default]
    S16,
    /// 32-bit float samples
    F32,
}

impl SampleFormat {
    /// Width of a single sample in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::S16 => 2,
            Self::F32 => 4,
        }
    }

    /// Total bytes for `samples_per_channel` interleaved samples across
    /// `channel_count` channels.
    pub fn buffer_size(self, samples_per_channel: usize, channel_count: u16) -> Result<usize> {
        if channel_count == 0 {
            return Err(MedleyError::InvalidLayout("zero audio channels".into()));
        }
        (samples_per_channel as u64)
            .checked_mul(channel_count as u64)
            .and_then(|s| s.checked_mul(self.bytes_per_sample() as u64))
            .and_then(|t| usize::try_from(t).ok())
            .ok_or_else(|| {
                MedleyError::InvalidLayout(format!(
                    "{samples_per_channel} samples x {channel_count} channels overflows"
                ))
            })
    }
}
