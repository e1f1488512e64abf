//! Shared helpers for session and CLI tests.

#![allow(dead_code)]

use std::io::{self, Read};
use std::sync::mpsc;

use flvscope::analysis::{DisplayEvent, SessionSummary};
use flvscope::config::SessionConfig;
use flvscope::presentation::Presenter;

pub const AUDIO: u8 = 8;
pub const VIDEO: u8 = 9;

pub const FLAGS_AUDIO_VIDEO: u8 = 0x05;
pub const FLAGS_VIDEO: u8 = 0x04;

/// Builds an FLV byte stream tag by tag.
pub struct FlvBuilder {
    buf: Vec<u8>,
    last_tag_size: u32,
}

impl FlvBuilder {
    pub fn new(flags: u8) -> Self {
        Self {
            buf: vec![b'F', b'L', b'V', 1, flags, 0, 0, 0, 9],
            last_tag_size: 0,
        }
    }

    pub fn tag(mut self, tag_type: u8, timestamp: u32, payload: &[u8]) -> Self {
        self.buf.extend_from_slice(&self.last_tag_size.to_be_bytes());
        self.buf.push(tag_type);
        self.buf
            .extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
        self.buf.extend_from_slice(&timestamp.to_be_bytes()[1..]);
        self.buf.push((timestamp >> 24) as u8);
        self.buf.extend_from_slice(&[0, 0, 0]);
        self.buf.extend_from_slice(payload);
        self.last_tag_size = 11 + payload.len() as u32;
        self
    }

    pub fn audio(self, timestamp: u32) -> Self {
        self.tag(AUDIO, timestamp, &[0xAF, 0x01, 0x21, 0x10])
    }

    pub fn video(self, timestamp: u32) -> Self {
        self.tag(VIDEO, timestamp, &[0x27, 0x01, 0x00, 0x00, 0x00, 0x65])
    }

    pub fn build(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(&self.last_tag_size.to_be_bytes());
        self.buf
    }
}

/// Session timings suited to tests: no pacing, no linger.
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        file_render_delay_ms: 0,
        completion_linger_ms: 0,
        ..SessionConfig::default()
    }
}

/// Remembers everything it is shown.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<DisplayEvent>,
    pub completed: Vec<SessionSummary>,
    pub ticks: usize,
}

impl RecordingPresenter {
    pub fn values(&self) -> Vec<i64> {
        self.events.iter().map(|e| e.value_ms).collect()
    }
}

impl Presenter for RecordingPresenter {
    fn window_capacity(&self) -> usize {
        100
    }

    fn on_event(&mut self, event: &DisplayEvent) -> io::Result<()> {
        self.events.push(*event);
        Ok(())
    }

    fn on_tick(&mut self) -> io::Result<()> {
        self.ticks += 1;
        Ok(())
    }

    fn on_complete(&mut self, summary: &SessionSummary) -> io::Result<()> {
        self.completed.push(*summary);
        Ok(())
    }
}

/// Serves `data`, then blocks until the paired sender is dropped, then
/// reports end of stream. Stands in for a stalled live source.
pub struct StallingReader {
    data: io::Cursor<Vec<u8>>,
    release: mpsc::Receiver<()>,
}

impl StallingReader {
    pub fn new(data: Vec<u8>) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let reader = Self {
            data: io::Cursor::new(data),
            release: rx,
        };
        (reader, tx)
    }
}

impl Read for StallingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        // Returns once the sender is dropped.
        let _ = self.release.recv();
        Ok(0)
    }
}
