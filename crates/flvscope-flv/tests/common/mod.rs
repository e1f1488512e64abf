//! Synthetic FLV streams for integration tests.

#![allow(dead_code)]

pub const AUDIO: u8 = 8;
pub const VIDEO: u8 = 9;
pub const SCRIPT: u8 = 18;

/// Builds an FLV byte stream tag by tag.
pub struct FlvBuilder {
    buf: Vec<u8>,
    last_tag_size: u32,
}

impl FlvBuilder {
    /// Header with the given flags and the standard 9-byte data offset.
    pub fn new(flags: u8) -> Self {
        Self::with_extension(flags, &[])
    }

    /// Header followed by `extension` bytes before the first tag.
    pub fn with_extension(flags: u8, extension: &[u8]) -> Self {
        let mut buf = vec![b'F', b'L', b'V', 1, flags];
        buf.extend_from_slice(&(9 + extension.len() as u32).to_be_bytes());
        buf.extend_from_slice(extension);
        Self {
            buf,
            last_tag_size: 0,
        }
    }

    pub fn tag(mut self, tag_type: u8, timestamp: u32, stream_id: u32, payload: &[u8]) -> Self {
        self.buf.extend_from_slice(&self.last_tag_size.to_be_bytes());
        self.buf.push(tag_type);
        self.buf
            .extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
        self.buf.extend_from_slice(&timestamp.to_be_bytes()[1..]);
        self.buf.push((timestamp >> 24) as u8);
        self.buf.extend_from_slice(&stream_id.to_be_bytes()[1..]);
        self.buf.extend_from_slice(payload);
        self.last_tag_size = 11 + payload.len() as u32;
        self
    }

    /// AAC raw frame.
    pub fn audio(self, timestamp: u32) -> Self {
        self.tag(AUDIO, timestamp, 0, &[0xAF, 0x01, 0x21, 0x10, 0x04])
    }

    /// AVC inter frame.
    pub fn video(self, timestamp: u32) -> Self {
        self.tag(VIDEO, timestamp, 0, &[0x27, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02])
    }

    /// Stream without the trailing previous-tag-size field.
    pub fn build_untrailed(self) -> Vec<u8> {
        self.buf
    }

    pub fn build(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(&self.last_tag_size.to_be_bytes());
        self.buf
    }
}

/// Script body: `"onMetaData"` followed by an ECMA array of numbers.
pub fn on_metadata(props: &[(&str, f64)]) -> Vec<u8> {
    let mut out = vec![0x02];
    put_string(&mut out, "onMetaData");
    out.push(0x08);
    out.extend_from_slice(&(props.len() as u32).to_be_bytes());
    for (key, value) in props {
        put_string(&mut out, key);
        out.push(0x00);
        out.extend_from_slice(&value.to_be_bytes());
    }
    out.extend_from_slice(&[0x00, 0x00, 0x09]);
    out
}

fn put_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}
