//! Audio tag headers.

use std::io::Read;

use super::{Payload, TagHeader};
use crate::{Error, Result};

/// Audio codec carried by the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    LinearPcmPlatformEndian,
    Adpcm,
    Mp3,
    LinearPcmLittleEndian,
    Nellymoser16kHzMono,
    Nellymoser8kHzMono,
    Nellymoser,
    G711ALaw,
    G711MuLaw,
    Aac,
    Speex,
    Mp3_8kHz,
    DeviceSpecific,
    /// Codes 9, 12 and 13 are reserved by the format.
    Reserved(u8),
}

impl SoundFormat {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::LinearPcmPlatformEndian,
            1 => Self::Adpcm,
            2 => Self::Mp3,
            3 => Self::LinearPcmLittleEndian,
            4 => Self::Nellymoser16kHzMono,
            5 => Self::Nellymoser8kHzMono,
            6 => Self::Nellymoser,
            7 => Self::G711ALaw,
            8 => Self::G711MuLaw,
            10 => Self::Aac,
            11 => Self::Speex,
            14 => Self::Mp3_8kHz,
            15 => Self::DeviceSpecific,
            other => Self::Reserved(other),
        }
    }
}

impl std::fmt::Display for SoundFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinearPcmPlatformEndian => write!(f, "LinearPCMPlatformEndian"),
            Self::Adpcm => write!(f, "ADPCM"),
            Self::Mp3 => write!(f, "MP3"),
            Self::LinearPcmLittleEndian => write!(f, "LinearPCMLittleEndian"),
            Self::Nellymoser16kHzMono => write!(f, "Nellymoser16kHzMono"),
            Self::Nellymoser8kHzMono => write!(f, "Nellymoser8kHzMono"),
            Self::Nellymoser => write!(f, "Nellymoser"),
            Self::G711ALaw => write!(f, "G711ALaw"),
            Self::G711MuLaw => write!(f, "G711muLaw"),
            Self::Aac => write!(f, "AAC"),
            Self::Speex => write!(f, "Speex"),
            Self::Mp3_8kHz => write!(f, "MP3_8kHz"),
            Self::DeviceSpecific => write!(f, "DeviceSpecific"),
            Self::Reserved(code) => write!(f, "Reserved({})", code),
        }
    }
}

/// Sampling rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundRate {
    Khz5_5,
    Khz11,
    Khz22,
    Khz44,
}

impl SoundRate {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Khz5_5,
            1 => Self::Khz11,
            2 => Self::Khz22,
            _ => Self::Khz44,
        }
    }

    /// Nominal rate in Hz.
    pub fn hz(&self) -> u32 {
        match self {
            Self::Khz5_5 => 5_512,
            Self::Khz11 => 11_025,
            Self::Khz22 => 22_050,
            Self::Khz44 => 44_100,
        }
    }
}

/// Sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundSize {
    Bits8,
    Bits16,
}

/// Channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    Mono,
    Stereo,
}

/// AAC packet kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AacPacketType {
    SequenceHeader,
    Raw,
    Unknown(u8),
}

impl AacPacketType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::SequenceHeader,
            1 => Self::Raw,
            other => Self::Unknown(other),
        }
    }
}

/// Codec header at the start of an audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTagHeader {
    pub sound_format: SoundFormat,
    pub sound_rate: SoundRate,
    pub sound_size: SoundSize,
    pub sound_type: SoundType,
    /// Present only for AAC.
    pub aac_packet_type: Option<AacPacketType>,
}

impl AudioTagHeader {
    /// Unpack the first payload byte. `aac_packet_type` is left unset.
    pub fn from_flags(flags: u8) -> Self {
        Self {
            sound_format: SoundFormat::from_u8(flags >> 4),
            sound_rate: SoundRate::from_bits(flags >> 2),
            sound_size: if flags & 0x02 != 0 {
                SoundSize::Bits16
            } else {
                SoundSize::Bits8
            },
            sound_type: if flags & 0x01 != 0 {
                SoundType::Stereo
            } else {
                SoundType::Mono
            },
            aac_packet_type: None,
        }
    }

    /// Read the codec header from the front of `body`.
    pub(crate) fn read<R: Read>(body: &mut Payload<'_, R>, tag: &TagHeader) -> Result<Self> {
        if body.remaining() < 1 {
            return Err(Error::malformed(tag.tag_type, tag.timestamp, "empty audio payload"));
        }
        let mut header = Self::from_flags(body.read_u8()?);

        if header.sound_format == SoundFormat::Aac {
            if body.remaining() < 1 {
                return Err(Error::malformed(
                    tag.tag_type,
                    tag.timestamp,
                    "AAC payload without packet type",
                ));
            }
            header.aac_packet_type = Some(AacPacketType::from_u8(body.read_u8()?));
        }

        Ok(header)
    }
}

/// An audio tag: its codec header and the undecoded codec bytes.
#[derive(Debug)]
pub struct AudioData<'a, R: Read> {
    pub header: AudioTagHeader,
    pub body: Payload<'a, R>,
}
