use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Producer/consumer hand-off and timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Display events buffered between decoder and presenter
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// End the session when nothing arrives for this long
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// End the session if fewer than two samples arrived by then
    #[serde(default = "default_settle_period")]
    pub settle_period_secs: u64,

    /// Redraw interval of the presenter
    #[serde(default = "default_render_tick")]
    pub render_tick_ms: u64,

    /// Pause after each event for file sources (0 disables)
    #[serde(default = "default_file_render_delay")]
    pub file_render_delay_ms: u64,

    /// How long the final frame stays up after completion
    #[serde(default = "default_completion_linger")]
    pub completion_linger_ms: u64,
}

fn default_queue_capacity() -> usize {
    10
}
fn default_idle_timeout() -> u64 {
    5
}
fn default_settle_period() -> u64 {
    10
}
fn default_render_tick() -> u64 {
    250
}
fn default_file_render_delay() -> u64 {
    5
}
fn default_completion_linger() -> u64 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            idle_timeout_secs: default_idle_timeout(),
            settle_period_secs: default_settle_period(),
            render_tick_ms: default_render_tick(),
            file_render_delay_ms: default_file_render_delay(),
            completion_linger_ms: default_completion_linger(),
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn settle_period(&self) -> Duration {
        Duration::from_secs(self.settle_period_secs)
    }

    pub fn render_tick(&self) -> Duration {
        Duration::from_millis(self.render_tick_ms)
    }

    pub fn file_render_delay(&self) -> Duration {
        Duration::from_millis(self.file_render_delay_ms)
    }

    pub fn completion_linger(&self) -> Duration {
        Duration::from_millis(self.completion_linger_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Fixed sample window size. Defaults to the terminal width minus
    /// `width_margin`.
    #[serde(default)]
    pub window_capacity: Option<usize>,

    #[serde(default = "default_width_margin")]
    pub width_margin: u16,

    /// Lowest upper bound of the chart's y axis, in milliseconds
    #[serde(default = "default_y_floor")]
    pub y_floor_ms: u64,
}

fn default_width_margin() -> u16 {
    5
}
fn default_y_floor() -> u64 {
    200
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_capacity: None,
            width_margin: default_width_margin(),
            y_floor_ms: default_y_floor(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User-Agent sent with HTTP requests
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
        }
    }
}

impl SourceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log file used while the terminal chart is active
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("flvscope.log"))
    }
}
