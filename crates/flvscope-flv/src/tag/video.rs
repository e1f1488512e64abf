//! Video tag headers.

use std::io::Read;

use super::{Payload, TagHeader};
use crate::{Error, Result};

/// Kind of video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    KeyFrame,
    InterFrame,
    DisposableInterFrame,
    GeneratedKeyFrame,
    VideoInfoCommandFrame,
    Unknown(u8),
}

impl FrameType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::KeyFrame,
            2 => Self::InterFrame,
            3 => Self::DisposableInterFrame,
            4 => Self::GeneratedKeyFrame,
            5 => Self::VideoInfoCommandFrame,
            other => Self::Unknown(other),
        }
    }

    pub fn is_keyframe(&self) -> bool {
        matches!(self, Self::KeyFrame | Self::GeneratedKeyFrame)
    }
}

/// Video codec carried by the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecId {
    Jpeg,
    SorensonH263,
    ScreenVideo,
    On2Vp6,
    On2Vp6WithAlpha,
    ScreenVideoV2,
    Avc,
    Unknown(u8),
}

impl CodecId {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Jpeg,
            2 => Self::SorensonH263,
            3 => Self::ScreenVideo,
            4 => Self::On2Vp6,
            5 => Self::On2Vp6WithAlpha,
            6 => Self::ScreenVideoV2,
            7 => Self::Avc,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for CodecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "JPEG"),
            Self::SorensonH263 => write!(f, "SorensonH263"),
            Self::ScreenVideo => write!(f, "ScreenVideo"),
            Self::On2Vp6 => write!(f, "On2VP6"),
            Self::On2Vp6WithAlpha => write!(f, "On2VP6WithAlphaChannel"),
            Self::ScreenVideoV2 => write!(f, "ScreenVideoVersion2"),
            Self::Avc => write!(f, "AVC"),
            Self::Unknown(id) => write!(f, "Unknown({})", id),
        }
    }
}

/// AVC packet kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcPacketType {
    SequenceHeader,
    Nalu,
    EndOfSequence,
    Unknown(u8),
}

impl AvcPacketType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::SequenceHeader,
            1 => Self::Nalu,
            2 => Self::EndOfSequence,
            other => Self::Unknown(other),
        }
    }
}

/// AVC-specific fields that follow the frame/codec byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvcPacket {
    pub packet_type: AvcPacketType,
    /// Presentation offset from the tag timestamp, in milliseconds.
    pub composition_time: i32,
}

/// Codec header at the start of a video payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTagHeader {
    pub frame_type: FrameType,
    pub codec_id: CodecId,
    /// Present only for AVC.
    pub avc: Option<AvcPacket>,
}

impl VideoTagHeader {
    /// Read the codec header from the front of `body`.
    pub(crate) fn read<R: Read>(body: &mut Payload<'_, R>, tag: &TagHeader) -> Result<Self> {
        if body.remaining() < 1 {
            return Err(Error::malformed(tag.tag_type, tag.timestamp, "empty video payload"));
        }
        let flags = body.read_u8()?;
        let mut header = Self {
            frame_type: FrameType::from_u8(flags >> 4),
            codec_id: CodecId::from_u8(flags & 0x0F),
            avc: None,
        };

        if header.codec_id == CodecId::Avc {
            if body.remaining() < 4 {
                return Err(Error::malformed(
                    tag.tag_type,
                    tag.timestamp,
                    format!("AVC header needs 4 bytes, {} left", body.remaining()),
                ));
            }
            let mut avc = [0u8; 4];
            body.read_exact(&mut avc)?;
            header.avc = Some(AvcPacket {
                packet_type: AvcPacketType::from_u8(avc[0]),
                composition_time: sign_extend_24([avc[1], avc[2], avc[3]]),
            });
        }

        Ok(header)
    }
}

/// Interpret three big-endian bytes as a signed 24-bit integer.
fn sign_extend_24(bytes: [u8; 3]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0]) >> 8
}

/// A video tag: its codec header and the undecoded codec bytes.
#[derive(Debug)]
pub struct VideoData<'a, R: Read> {
    pub header: VideoTagHeader,
    pub body: Payload<'a, R>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend_24() {
        assert_eq!(sign_extend_24([0x00, 0x00, 0x00]), 0);
        assert_eq!(sign_extend_24([0x00, 0x00, 0x43]), 67);
        assert_eq!(sign_extend_24([0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(sign_extend_24([0xFF, 0xFF, 0xDF]), -33);
        assert_eq!(sign_extend_24([0x7F, 0xFF, 0xFF]), 8_388_607);
        assert_eq!(sign_extend_24([0x80, 0x00, 0x00]), -8_388_608);
    }

    #[test]
    fn test_frame_and_codec_codes() {
        assert!(FrameType::from_u8(1).is_keyframe());
        assert!(FrameType::from_u8(4).is_keyframe());
        assert!(!FrameType::from_u8(2).is_keyframe());
        assert_eq!(FrameType::from_u8(9), FrameType::Unknown(9));
        assert_eq!(CodecId::from_u8(7), CodecId::Avc);
        assert_eq!(CodecId::from_u8(12).to_string(), "Unknown(12)");
        assert_eq!(AvcPacketType::from_u8(2), AvcPacketType::EndOfSequence);
    }
}
