//! FLV container header.

use crate::{Error, Result};

/// The `FLV` signature every stream starts with.
pub const SIGNATURE: [u8; 3] = *b"FLV";

/// Size of the fixed container header.
pub const HEADER_LEN: u32 = 9;

/// Flag bit set when the stream carries audio tags.
pub const FLAG_AUDIO: u8 = 0x01;

/// Flag bit set when the stream carries video tags.
pub const FLAG_VIDEO: u8 = 0x04;

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlvHeader {
    /// Format version (1 for every known writer).
    pub version: u8,
    /// Raw type flags.
    pub flags: u8,
    /// Offset of the first tag's previous-tag-size field.
    pub data_offset: u32,
}

impl FlvHeader {
    /// Parse the fixed 9-byte header.
    pub fn parse(bytes: &[u8; 9]) -> Result<Self> {
        let signature = [bytes[0], bytes[1], bytes[2]];
        if signature != SIGNATURE {
            return Err(Error::InvalidSignature(signature));
        }

        let data_offset = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        if data_offset < HEADER_LEN {
            return Err(Error::invalid_header(format!(
                "data offset {} is smaller than the {} byte header",
                data_offset, HEADER_LEN
            )));
        }

        Ok(Self {
            version: bytes[3],
            flags: bytes[4],
            data_offset,
        })
    }

    /// Whether the header declares an audio track.
    pub fn has_audio(&self) -> bool {
        self.flags & FLAG_AUDIO != 0
    }

    /// Whether the header declares a video track.
    pub fn has_video(&self) -> bool {
        self.flags & FLAG_VIDEO != 0
    }

    /// Number of header extension bytes between the fixed header and the first tag.
    pub fn extension_len(&self) -> u32 {
        self.data_offset - HEADER_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audio_video_header() {
        let header = FlvHeader::parse(&[b'F', b'L', b'V', 1, 0x05, 0, 0, 0, 9]).unwrap();
        assert_eq!(header.version, 1);
        assert!(header.has_audio());
        assert!(header.has_video());
        assert_eq!(header.extension_len(), 0);
    }

    #[test]
    fn test_parse_video_only_header() {
        let header = FlvHeader::parse(&[b'F', b'L', b'V', 1, 0x04, 0, 0, 0, 13]).unwrap();
        assert!(!header.has_audio());
        assert!(header.has_video());
        assert_eq!(header.extension_len(), 4);
    }

    #[test]
    fn test_reject_bad_signature() {
        let err = FlvHeader::parse(&[b'F', b'L', b'X', 1, 0x05, 0, 0, 0, 9]).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature(sig) if sig == *b"FLX"));
    }

    #[test]
    fn test_reject_short_data_offset() {
        let err = FlvHeader::parse(&[b'F', b'L', b'V', 1, 0x05, 0, 0, 0, 8]).unwrap_err();
        assert!(err.is_format_error());
    }
}
