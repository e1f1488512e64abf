//! FLV tags.
//!
//! A tag is an 11-byte header followed by `data_size` payload bytes whose
//! layout depends on the tag type.

mod audio;
mod payload;
mod video;

pub use audio::{
    AacPacketType, AudioData, AudioTagHeader, SoundFormat, SoundRate, SoundSize, SoundType,
};
pub use payload::Payload;
pub use video::{AvcPacket, AvcPacketType, CodecId, FrameType, VideoData, VideoTagHeader};

use std::io::Read;

use crate::script::ScriptData;
use crate::Result;

/// Size of the fixed tag header (excluding the previous-tag-size field).
pub const TAG_HEADER_LEN: u32 = 11;

/// Tag type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    Audio,
    Video,
    ScriptData,
    Unknown(u8),
}

impl TagType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            8 => Self::Audio,
            9 => Self::Video,
            18 => Self::ScriptData,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Audio => 8,
            Self::Video => 9,
            Self::ScriptData => 18,
            Self::Unknown(value) => *value,
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::ScriptData => write!(f, "script data"),
            Self::Unknown(value) => write!(f, "unknown ({})", value),
        }
    }
}

/// Fixed tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub tag_type: TagType,
    /// Payload length in bytes (24 bits).
    pub data_size: u32,
    /// Decode timestamp in milliseconds, extension byte included.
    pub timestamp: u32,
    /// Always zero in practice (24 bits).
    pub stream_id: u32,
}

impl TagHeader {
    /// Parse the 11 bytes that follow a previous-tag-size field.
    pub fn parse(bytes: &[u8; 11]) -> Self {
        Self {
            tag_type: TagType::from_u8(bytes[0]),
            data_size: u32::from_be_bytes([0, bytes[1], bytes[2], bytes[3]]),
            // The extension byte holds the upper 8 bits.
            timestamp: u32::from_be_bytes([bytes[7], bytes[4], bytes[5], bytes[6]]),
            stream_id: u32::from_be_bytes([0, bytes[8], bytes[9], bytes[10]]),
        }
    }

    /// Size of the whole tag as recorded by the following previous-tag-size field.
    pub fn tag_size(&self) -> u32 {
        TAG_HEADER_LEN + self.data_size
    }
}

/// Type-specific tag content.
#[derive(Debug)]
pub enum TagData<'a, R: Read> {
    Audio(AudioData<'a, R>),
    Video(VideoData<'a, R>),
    ScriptData(ScriptData),
    /// A tag type this decoder does not know. The payload is left opaque.
    Unknown(Payload<'a, R>),
}

/// A decoded tag.
///
/// Borrows the decoder until it is dropped or [`finish`](Tag::finish)ed.
#[derive(Debug)]
pub struct Tag<'a, R: Read> {
    pub header: TagHeader,
    pub data: TagData<'a, R>,
}

impl<R: Read> Tag<'_, R> {
    /// Discard any unread payload bytes, reporting I/O errors.
    pub fn finish(self) -> Result<()> {
        match self.data {
            TagData::Audio(audio) => {
                audio.body.discard()?;
            }
            TagData::Video(video) => {
                video.body.discard()?;
            }
            TagData::Unknown(body) => {
                body.discard()?;
            }
            TagData::ScriptData(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_header() {
        let header = TagHeader::parse(&[9, 0x00, 0x01, 0x00, 0x00, 0x00, 0x28, 0x00, 0, 0, 0]);
        assert_eq!(header.tag_type, TagType::Video);
        assert_eq!(header.data_size, 256);
        assert_eq!(header.timestamp, 40);
        assert_eq!(header.stream_id, 0);
        assert_eq!(header.tag_size(), 267);
    }

    #[test]
    fn test_timestamp_extension_is_high_byte() {
        let header = TagHeader::parse(&[8, 0, 0, 1, 0x12, 0x34, 0x56, 0x01, 0, 0, 7]);
        assert_eq!(header.tag_type, TagType::Audio);
        assert_eq!(header.timestamp, 0x0112_3456);
        assert_eq!(header.stream_id, 7);
    }

    #[test]
    fn test_tag_type_codes() {
        for code in 0..=u8::MAX {
            assert_eq!(TagType::from_u8(code).as_u8(), code);
        }
        assert_eq!(TagType::from_u8(18), TagType::ScriptData);
        assert_eq!(TagType::from_u8(15).to_string(), "unknown (15)");
    }
}
