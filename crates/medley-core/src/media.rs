//! Media kind discriminator shared by blocks, frames, and pools.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of decoded media a block carries.
///
/// Fixed for the lifetime of a block: a video block stays a video block
/// through any number of recycle cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
}

impl MediaKind {
    /// All media kinds, in component order.
    pub const ALL: [MediaKind; 3] = [MediaKind::Video, MediaKind::Audio, MediaKind::Subtitle];
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Subtitle => "subtitle",
        };
        f.write_str(name)
    }
}
