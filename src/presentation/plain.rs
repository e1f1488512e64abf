use std::io::{self, Write};

use super::Presenter;
use crate::analysis::{DisplayEvent, SessionSummary};

/// Writes one line per sample.
pub struct LogPresenter<W: Write> {
    out: W,
    window_capacity: usize,
    count: u64,
}

impl<W: Write> LogPresenter<W> {
    pub fn new(out: W, window_capacity: usize) -> Self {
        Self {
            out,
            window_capacity,
            count: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for LogPresenter<W> {
    fn window_capacity(&self) -> usize {
        self.window_capacity
    }

    fn on_event(&mut self, event: &DisplayEvent) -> io::Result<()> {
        self.count += 1;
        writeln!(
            self.out,
            "{:>8} {:>6} ms  {}",
            self.count,
            event.value_ms,
            event.label()
        )
    }

    fn on_complete(&mut self, _summary: &SessionSummary) -> io::Result<()> {
        self.out.flush()
    }
}
