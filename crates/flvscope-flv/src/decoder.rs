//! Sequential FLV tag decoder.

use bytes::Bytes;
use std::io::{self, Read};

use crate::header::FlvHeader;
use crate::script::{Amf0Decoder, ScriptDecoder};
use crate::tag::{
    AudioData, AudioTagHeader, Payload, Tag, TagData, TagHeader, TagType, VideoData,
    VideoTagHeader,
};
use crate::{Error, Result};

/// Forward-only FLV decoder.
///
/// The container header is read and validated by the constructor; each call
/// to [`next_tag`](Self::next_tag) then reads exactly one tag. The reader is
/// never seeked, so any `Read` works, including network bodies.
pub struct FlvDecoder<R, D = Amf0Decoder> {
    reader: R,
    header: FlvHeader,
    script_decoder: D,
    /// Size the next previous-tag-size field should carry.
    last_tag_size: u32,
    /// Set when a dropped payload could not be drained.
    drain_failure: Option<io::ErrorKind>,
    tags_read: u64,
    size_mismatches: u64,
}

impl<R: Read> FlvDecoder<R> {
    /// Read the container header and prepare to decode tags.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_script_decoder(reader, Amf0Decoder)
    }
}

impl<R: Read, D: ScriptDecoder> FlvDecoder<R, D> {
    /// Like [`FlvDecoder::new`], with a custom script data decoder.
    pub fn with_script_decoder(mut reader: R, script_decoder: D) -> Result<Self> {
        let mut fixed = [0u8; 9];
        reader.read_exact(&mut fixed)?;
        let header = FlvHeader::parse(&fixed)?;

        let extension = u64::from(header.extension_len());
        if extension > 0 {
            let skipped = io::copy(&mut (&mut reader).take(extension), &mut io::sink())?;
            if skipped < extension {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside the header extension",
                )));
            }
        }

        tracing::debug!(
            version = header.version,
            has_audio = header.has_audio(),
            has_video = header.has_video(),
            data_offset = header.data_offset,
            "Read FLV header"
        );

        Ok(Self {
            reader,
            header,
            script_decoder,
            last_tag_size: 0,
            drain_failure: None,
            tags_read: 0,
            size_mismatches: 0,
        })
    }

    /// The container header.
    pub fn header(&self) -> &FlvHeader {
        &self.header
    }

    /// Number of tag headers read so far.
    pub fn tags_read(&self) -> u64 {
        self.tags_read
    }

    /// Number of previous-tag-size fields that did not match the tag before.
    pub fn size_mismatches(&self) -> u64 {
        self.size_mismatches
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Decode the next tag.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly on a tag boundary. A
    /// stream that ends anywhere else is an [`Error::Io`]. Errors for which
    /// [`Error::is_recoverable`] holds leave the stream on the next tag
    /// boundary, so decoding may continue.
    pub fn next_tag(&mut self) -> Result<Option<Tag<'_, R>>> {
        if let Some(kind) = self.drain_failure.take() {
            return Err(Error::Io(io::Error::new(
                kind,
                "previous tag payload could not be drained",
            )));
        }

        let mut size_field = [0u8; 4];
        if !read_exact_or_eof(&mut self.reader, &mut size_field)? {
            return Ok(None);
        }
        let previous_tag_size = u32::from_be_bytes(size_field);
        if previous_tag_size != self.last_tag_size {
            self.size_mismatches += 1;
            tracing::warn!(
                expected = self.last_tag_size,
                found = previous_tag_size,
                tag = self.tags_read,
                "Previous tag size mismatch"
            );
        }

        let mut fixed = [0u8; 11];
        if !read_exact_or_eof(&mut self.reader, &mut fixed)? {
            return Ok(None);
        }
        let header = TagHeader::parse(&fixed);
        self.last_tag_size = header.tag_size();
        self.tags_read += 1;

        let Self {
            reader,
            script_decoder,
            drain_failure,
            ..
        } = self;
        let mut body = Payload::new(reader, header.data_size, drain_failure);

        let data = match header.tag_type {
            TagType::Audio => {
                let audio = AudioTagHeader::read(&mut body, &header)?;
                TagData::Audio(AudioData {
                    header: audio,
                    body,
                })
            }
            TagType::Video => {
                let video = VideoTagHeader::read(&mut body, &header)?;
                TagData::Video(VideoData {
                    header: video,
                    body,
                })
            }
            TagType::ScriptData => {
                let raw = body.read_to_vec()?;
                let script = script_decoder
                    .decode(Bytes::from(raw))
                    .map_err(|source| Error::Script {
                        timestamp: header.timestamp,
                        source,
                    })?;
                TagData::ScriptData(script)
            }
            TagType::Unknown(code) => {
                tracing::debug!(
                    code,
                    size = header.data_size,
                    timestamp = header.timestamp,
                    "Forwarding tag of unknown type"
                );
                TagData::Unknown(body)
            }
        };

        Ok(Some(Tag { header, data }))
    }
}

/// Fill `buf`, or return `false` if the stream was already at its end.
///
/// Running out after the first byte is an `UnexpectedEof` error.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("stream ended after {} of {} bytes", filled, buf.len()),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A reader that returns at most one byte per call.
    #[derive(Debug)]
    struct Trickle<R>(R);

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    fn stream(tags: &[(u8, u32, &[u8])]) -> Vec<u8> {
        let mut out = vec![b'F', b'L', b'V', 1, 0x05, 0, 0, 0, 9];
        let mut previous = 0u32;
        for (tag_type, timestamp, payload) in tags {
            out.extend_from_slice(&previous.to_be_bytes());
            out.push(*tag_type);
            out.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
            out.extend_from_slice(&timestamp.to_be_bytes()[1..]);
            out.push((timestamp >> 24) as u8);
            out.extend_from_slice(&[0, 0, 0]);
            out.extend_from_slice(payload);
            previous = 11 + payload.len() as u32;
        }
        out.extend_from_slice(&previous.to_be_bytes());
        out
    }

    #[test]
    fn test_read_exact_or_eof() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(!read_exact_or_eof(&mut empty, &mut [0u8; 4]).unwrap());

        let mut short = Cursor::new(vec![1u8, 2]);
        let err = read_exact_or_eof(&mut short, &mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut trickle = Trickle(Cursor::new(vec![1u8, 2, 3, 4]));
        let mut buf = [0u8; 4];
        assert!(read_exact_or_eof(&mut trickle, &mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_avc_and_aac() {
        let data = stream(&[
            (9, 0, &[0x17, 0x00, 0x00, 0x00, 0x00, 0xAA, 0xBB][..]),
            (8, 0, &[0xAF, 0x00, 0x12, 0x10][..]),
            (9, 40, &[0x27, 0x01, 0x00, 0x00, 0x50, 0xCC][..]),
        ]);
        let mut decoder = FlvDecoder::new(Trickle(Cursor::new(data))).unwrap();
        assert!(decoder.header().has_audio());

        let tag = decoder.next_tag().unwrap().unwrap();
        match &tag.data {
            TagData::Video(video) => {
                assert!(video.header.frame_type.is_keyframe());
                let avc = video.header.avc.unwrap();
                assert_eq!(avc.packet_type, crate::tag::AvcPacketType::SequenceHeader);
                assert_eq!(video.body.remaining(), 2);
            }
            other => panic!("expected video, got {:?}", other),
        }
        tag.finish().unwrap();

        {
            let tag = decoder.next_tag().unwrap().unwrap();
            match tag.data {
                TagData::Audio(audio) => {
                    assert_eq!(
                        audio.header.aac_packet_type,
                        Some(crate::tag::AacPacketType::SequenceHeader)
                    );
                    assert_eq!(audio.body.read_to_vec().unwrap(), vec![0x12, 0x10]);
                }
                other => panic!("expected audio, got {:?}", other),
            }
        }

        let tag = decoder.next_tag().unwrap().unwrap();
        assert_eq!(tag.header.timestamp, 40);
        match &tag.data {
            TagData::Video(video) => {
                assert_eq!(video.header.avc.unwrap().composition_time, 80);
            }
            other => panic!("expected video, got {:?}", other),
        }
        drop(tag);

        assert!(decoder.next_tag().unwrap().is_none());
        assert_eq!(decoder.tags_read(), 3);
    }

    #[test]
    fn test_malformed_tag_keeps_framing() {
        let data = stream(&[(9, 0, &[0x17, 0x01][..]), (9, 33, &[0x22, 0x00][..])]);
        let mut decoder = FlvDecoder::new(Cursor::new(data)).unwrap();

        let err = decoder.next_tag().unwrap_err();
        assert!(err.is_recoverable());

        let tag = decoder.next_tag().unwrap().unwrap();
        assert_eq!(tag.header.timestamp, 33);
    }

    #[test]
    fn test_drain_failure_surfaces_on_next_call() {
        let mut data = stream(&[(9, 0, &[0x22; 64][..])]);
        // Cut the stream inside the payload.
        data.truncate(9 + 4 + 11 + 10);
        let mut decoder = FlvDecoder::new(Cursor::new(data)).unwrap();

        let tag = decoder.next_tag().unwrap().unwrap();
        drop(tag);

        let err = decoder.next_tag().unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }
}
