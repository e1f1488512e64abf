//! Audio/video timestamp sync analysis.
//!
//! [`SyncAnalyzer`] consumes tag headers in stream order. With both tracks
//! present it measures how far the latest audio timestamp is from the latest
//! video timestamp each time an audio tag arrives. For streams without audio
//! it measures the gap between consecutive video timestamps instead.

mod window;

pub use window::SampleWindow;

use flvscope_flv::{TagHeader, TagType};

/// Video timeline position after which missing audio is reported.
const MISSING_AUDIO_AFTER_MS: u32 = 5_000;

/// What a sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Audio timestamp at or past the video timestamp.
    AudioAhead,
    /// Video timestamp past the audio timestamp.
    VideoAhead,
    /// Video timestamp increment on a stream without audio.
    VideoOnly,
}

impl SyncDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AudioAhead => "audio ahead",
            Self::VideoAhead => "video ahead",
            Self::VideoOnly => "video only",
        }
    }
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One sample for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEvent {
    pub direction: SyncDirection,
    /// Deviation magnitude or video increment, in milliseconds.
    pub value_ms: i64,
}

impl DisplayEvent {
    pub fn label(&self) -> &'static str {
        self.direction.label()
    }
}

/// Final figures of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Last video timestamp seen, 0 without video.
    pub final_duration_ms: u32,
    /// Largest deviation (or increment, without audio) seen.
    pub max_deviation_ms: i64,
    pub audio_present: bool,
}

impl SessionSummary {
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.final_duration_ms) / 1000.0
    }
}

/// Running sync state for one stream.
#[derive(Debug)]
pub struct SyncAnalyzer {
    audio_present: bool,
    last_audio: Option<u32>,
    last_video: Option<u32>,
    max_deviation: i64,
    window: SampleWindow,
    missing_audio_reported: bool,
}

impl SyncAnalyzer {
    /// `audio_present` comes from the container header flags.
    pub fn new(audio_present: bool, window_capacity: usize) -> Self {
        Self {
            audio_present,
            last_audio: None,
            last_video: None,
            max_deviation: 0,
            window: SampleWindow::new(window_capacity),
            missing_audio_reported: false,
        }
    }

    /// Feed the next tag header, returning a sample if one was produced.
    pub fn observe(&mut self, tag: &TagHeader) -> Option<DisplayEvent> {
        match tag.tag_type {
            TagType::Audio => self.on_audio(tag.timestamp),
            TagType::Video => self.on_video(tag.timestamp),
            TagType::ScriptData | TagType::Unknown(_) => None,
        }
    }

    fn on_audio(&mut self, timestamp: u32) -> Option<DisplayEvent> {
        self.last_audio = Some(timestamp);
        let video = self.last_video?;

        let deviation = i64::from(timestamp) - i64::from(video);
        let direction = if deviation < 0 {
            SyncDirection::VideoAhead
        } else {
            SyncDirection::AudioAhead
        };
        Some(self.record(direction, deviation.abs()))
    }

    fn on_video(&mut self, timestamp: u32) -> Option<DisplayEvent> {
        let previous = self.last_video.replace(timestamp);

        if self.audio_present {
            self.check_missing_audio(timestamp);
            return None;
        }

        let increment = i64::from(timestamp) - i64::from(previous?);
        Some(self.record(SyncDirection::VideoOnly, increment))
    }

    fn record(&mut self, direction: SyncDirection, value_ms: i64) -> DisplayEvent {
        self.max_deviation = self.max_deviation.max(value_ms);
        self.window.push(value_ms);
        DisplayEvent {
            direction,
            value_ms,
        }
    }

    fn check_missing_audio(&mut self, video_timestamp: u32) {
        if self.missing_audio_reported
            || self.last_audio.is_some()
            || video_timestamp <= MISSING_AUDIO_AFTER_MS
        {
            return;
        }
        self.missing_audio_reported = true;
        tracing::warn!(
            video_ms = video_timestamp,
            "Stream declares audio but carries no audio tags"
        );
    }

    pub fn audio_present(&self) -> bool {
        self.audio_present
    }

    pub fn last_audio(&self) -> Option<u32> {
        self.last_audio
    }

    pub fn last_video(&self) -> Option<u32> {
        self.last_video
    }

    /// Whether the missing-audio warning has been logged.
    pub fn missing_audio_reported(&self) -> bool {
        self.missing_audio_reported
    }

    pub fn max_deviation(&self) -> i64 {
        self.max_deviation
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            final_duration_ms: self.last_video.unwrap_or(0),
            max_deviation_ms: self.max_deviation,
            audio_present: self.audio_present,
        }
    }
}
