//! Presentation of display events.

mod plain;
pub mod terminal;

pub use plain::LogPresenter;
pub use terminal::TerminalPresenter;

use std::io;

use crate::analysis::{DisplayEvent, SessionSummary};

/// Consumer side of a session.
///
/// All methods run on the async side of the session, between queue reads.
pub trait Presenter {
    /// Number of recent samples the presenter shows. Also sizes the
    /// analyzer's window.
    fn window_capacity(&self) -> usize;

    fn on_event(&mut self, event: &DisplayEvent) -> io::Result<()>;

    /// Periodic redraw, e.g. after a terminal resize.
    fn on_tick(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn on_complete(&mut self, summary: &SessionSummary) -> io::Result<()>;
}
