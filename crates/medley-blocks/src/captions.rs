//! CEA-608 closed caption packets carried in video side data.
//!
//! Decoders hand captions over as raw byte triplets attached to pictures.
//! Packets keep a timestamp so a caption renderer can merge the streams of
//! several blocks and replay them in presentation order.

use medley_core::Timestamp;
use std::cmp::Ordering;

/// One caption triplet: a header byte and two 7-bit-plus-parity data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedCaptionPacket {
    /// Presentation time of the picture that carried this packet
    pub timestamp: Timestamp,
    /// Raw `cc_data` triplet as emitted by the decoder
    pub data: [u8; 3],
}

impl ClosedCaptionPacket {
    pub fn new(timestamp: Timestamp, data: [u8; 3]) -> Self {
        Self { timestamp, data }
    }

    /// Whether the header marks this triplet as valid NTSC caption data.
    pub fn is_valid(&self) -> bool {
        self.data[0] & 0x04 != 0 && self.data[0] & 0x02 == 0
    }

    /// Field the packet belongs to, 1 or 2.
    pub fn field(&self) -> u8 {
        (self.data[0] & 0x01) + 1
    }

    /// First data byte with the parity bit stripped.
    pub fn d0(&self) -> u8 {
        self.data[1] & 0x7F
    }

    /// Second data byte with the parity bit stripped.
    pub fn d1(&self) -> u8 {
        self.data[2] & 0x7F
    }

    /// Whether the data bytes form a control code pair rather than text.
    pub fn is_control(&self) -> bool {
        matches!(self.d0(), 0x10..=0x1F)
    }

    /// Caption channel addressed by a control code, 1 or 2.
    ///
    /// Text packets carry no channel of their own; they belong to whichever
    /// channel the preceding control code selected, so this reports 1.
    pub fn channel(&self) -> u8 {
        if self.is_control() && self.d0() & 0x08 != 0 {
            2
        } else {
            1
        }
    }
}

impl PartialOrd for ClosedCaptionPacket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClosedCaptionPacket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.data.cmp(&other.data))
    }
}
