//! Full-screen chart of recent samples.
//!
//! Terminal state is restored on drop and on panic. Keyboard input is read
//! on a separate thread that cancels the session on `q`, `Esc` or Ctrl-C.

use std::io::{self, Stdout};
use std::panic;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style, Stylize};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph};
use ratatui::{Frame, Terminal};
use tokio_util::sync::CancellationToken;

use super::Presenter;
use crate::analysis::{DisplayEvent, SampleWindow, SessionSummary, SyncDirection};
use crate::config::DisplayConfig;

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Sets up the terminal: raw mode and alternate screen.
///
/// Call `install_panic_hook()` first so a panic restores the terminal.
/// Raw mode is switched back off if any later step fails.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    restore_on_error(enter_alternate_screen(), restore_terminal)
}

fn enter_alternate_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Runs `restore` when `result` is an error, then hands `result` back.
fn restore_on_error<T>(result: Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    if result.is_err() {
        if let Err(e) = restore() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
    result
}

/// Leaves the alternate screen and raw mode. Safe to call more than once.
pub fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the panic.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Whether `key` should end the session.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Watch the keyboard until a quit key is pressed or `cancel` fires.
///
/// Raw mode swallows SIGINT, so Ctrl-C arrives here as a key.
pub fn spawn_key_watcher(cancel: CancellationToken) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !cancel.is_cancelled() {
            match event::poll(KEY_POLL_INTERVAL) {
                Ok(false) => {}
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => {
                        tracing::debug!("Quit key pressed");
                        cancel.cancel();
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Failed to read terminal event: {}", e);
                        return;
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to poll terminal events: {}", e);
                    return;
                }
            }
        }
    })
}

/// What the chart shows, independent of the terminal it is drawn on.
#[derive(Debug, Clone)]
pub struct ChartState {
    title: String,
    window: SampleWindow,
    y_floor_ms: u64,
    latest: Option<DisplayEvent>,
    max_ms: i64,
    summary: Option<SessionSummary>,
}

impl ChartState {
    pub fn new(title: impl Into<String>, window_capacity: usize, y_floor_ms: u64) -> Self {
        Self {
            title: title.into(),
            window: SampleWindow::new(window_capacity),
            y_floor_ms,
            latest: None,
            max_ms: 0,
            summary: None,
        }
    }

    pub fn push(&mut self, event: &DisplayEvent) {
        self.window.push(event.value_ms);
        self.max_ms = self.max_ms.max(event.value_ms);
        self.latest = Some(*event);
    }

    pub fn complete(&mut self, summary: &SessionSummary) {
        self.summary = Some(*summary);
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Y axis range: never below zero at the bottom, never under the floor
    /// at the top.
    pub fn y_bounds(&self) -> [f64; 2] {
        let low = self.window.min().unwrap_or(0).min(0);
        let high = self.window.max().unwrap_or(0).max(self.y_floor_ms as i64);
        [low as f64, high as f64]
    }

    fn status_line(&self) -> Line<'_> {
        let mut spans = Vec::new();
        match self.latest {
            Some(event) => {
                let color = match event.direction {
                    SyncDirection::AudioAhead => Color::Green,
                    SyncDirection::VideoAhead => Color::Yellow,
                    SyncDirection::VideoOnly => Color::Cyan,
                };
                spans.push(Span::raw("Latest: "));
                spans.push(Span::styled(
                    format!("{} ms {}", event.value_ms, event.label()),
                    Style::default().fg(color),
                ));
            }
            None => spans.push(Span::raw("Waiting for samples")),
        }
        spans.push(Span::raw(format!("   Max: {} ms", self.max_ms)));

        if let Some(summary) = self.summary {
            spans.push(Span::raw("   "));
            spans.push(
                format!("Done, video duration {:.1}s", summary.duration_secs())
                    .bold(),
            );
        }
        spans.push(Span::raw("   [q] quit").dark_gray());
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame) {
        let [status_area, chart_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(frame.area());

        frame.render_widget(Paragraph::new(self.status_line()), status_area);

        let points = self.window.points();
        let dataset = Dataset::default()
            .name(self.series_name())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let [y_low, y_high] = self.y_bounds();
        let x_high = self.window.capacity().saturating_sub(1).max(1) as f64;
        let chart = Chart::new(vec![dataset])
            .block(Block::bordered().title(self.title.as_str()))
            .x_axis(
                Axis::default()
                    .title("samples")
                    .bounds([0.0, x_high])
                    .labels(["oldest".to_string(), "newest".to_string()]),
            )
            .y_axis(
                Axis::default()
                    .title("ms")
                    .bounds([y_low, y_high])
                    .labels([format!("{}", y_low), format!("{}", y_high)]),
            );
        frame.render_widget(chart, chart_area);
    }

    fn series_name(&self) -> &'static str {
        match self.latest.map(|e| e.direction) {
            Some(SyncDirection::VideoOnly) => "video timestamp increment",
            _ => "audio/video difference",
        }
    }
}

/// Draws the sample window as a line chart.
pub struct TerminalPresenter {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: ChartState,
}

impl TerminalPresenter {
    /// Take over the terminal. The window is sized from the display config,
    /// or from the terminal width.
    pub fn new(title: impl Into<String>, display: &DisplayConfig) -> Result<Self> {
        let capacity = match display.window_capacity {
            Some(capacity) => capacity,
            None => {
                let (width, _) =
                    crossterm::terminal::size().context("Failed to read terminal size")?;
                usize::from(width.saturating_sub(display.width_margin))
            }
        };

        install_panic_hook();
        let terminal = setup_terminal()?;
        let mut presenter = Self {
            terminal,
            state: ChartState::new(title, capacity.max(1), display.y_floor_ms),
        };
        presenter.draw().context("Failed to draw initial frame")?;
        Ok(presenter)
    }

    fn draw(&mut self) -> io::Result<()> {
        let state = &self.state;
        self.terminal.draw(|frame| state.render(frame))?;
        Ok(())
    }
}

impl Presenter for TerminalPresenter {
    fn window_capacity(&self) -> usize {
        self.state.window().capacity()
    }

    fn on_event(&mut self, event: &DisplayEvent) -> io::Result<()> {
        self.state.push(event);
        self.draw()
    }

    fn on_tick(&mut self) -> io::Result<()> {
        self.draw()
    }

    fn on_complete(&mut self, summary: &SessionSummary) -> io::Result<()> {
        self.state.complete(summary);
        self.draw()
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}
