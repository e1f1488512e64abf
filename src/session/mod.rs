//! One analysis run: decoder and analyzer on a blocking worker, presenter
//! on the async side, joined by a bounded queue.

mod producer;

use std::io::{self, Read};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::analysis::SessionSummary;
use crate::config::{SessionConfig, SourceConfig};
use crate::presentation::Presenter;
use crate::source::{ByteSource, SourceError};
use producer::Opener;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Decode error")]
    Decode(#[from] flvscope_flv::Error),

    #[error("Presentation error")]
    Presentation(#[source] io::Error),

    #[error("Decoder task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error("Decoder task ended without a result")]
    WorkerLost,
}

/// How a session ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// End of stream was reached.
    Completed(SessionSummary),
    /// Nothing arrived for too long, or too little by the settle period.
    IdleTimeout,
    Cancelled,
}

pub struct Session {
    open: Opener,
    config: SessionConfig,
    live: bool,
}

impl Session {
    /// A session over `source`. The source is opened on the decode worker.
    pub fn open(source: ByteSource, source_config: SourceConfig, config: SessionConfig) -> Self {
        let live = source.is_live();
        Self {
            open: Box::new(move || source.open(&source_config)),
            config,
            live,
        }
    }

    /// A session over an already open reader, treated as a file.
    pub fn from_reader<R>(reader: R, config: SessionConfig) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            open: Box::new(move || {
                Ok::<_, SourceError>(Box::new(reader) as Box<dyn Read + Send>)
            }),
            config,
            live: false,
        }
    }

    /// Mark the source as live, which disables render pacing.
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Run until completion, idle timeout or cancellation.
    ///
    /// Cancellation does not reach the decode worker. It stops at its next
    /// send, or is abandoned with the runtime if blocked on a read.
    pub async fn run<P: Presenter>(
        self,
        presenter: &mut P,
        cancel: CancellationToken,
    ) -> Result<SessionOutcome, SessionError> {
        let Session { open, config, live } = self;

        let (event_tx, mut events) = mpsc::channel(config.queue_capacity.max(1));
        let (done_tx, mut done) = oneshot::channel();
        let window_capacity = presenter.window_capacity();

        let worker = tokio::task::spawn_blocking(move || {
            let result = producer::produce(open, window_capacity, event_tx);
            let _ = done_tx.send(result);
        });

        let idle_timeout = config.idle_timeout();
        let render_delay = if live {
            std::time::Duration::ZERO
        } else {
            config.file_render_delay()
        };

        let idle = tokio::time::sleep(idle_timeout);
        let settle = tokio::time::sleep(config.settle_period());
        tokio::pin!(idle, settle);
        let mut settled = false;
        let mut ticker = tokio::time::interval(config.render_tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut received = 0usize;
        let mut events_open = true;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!(events = received, "Session cancelled");
                    return Ok(SessionOutcome::Cancelled);
                }
                event = events.recv(), if events_open => {
                    let Some(event) = event else {
                        events_open = false;
                        continue;
                    };
                    received += 1;
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                    presenter.on_event(&event).map_err(SessionError::Presentation)?;
                    if !render_delay.is_zero() {
                        tokio::time::sleep(render_delay).await;
                    }
                }
                result = &mut done => {
                    let summary = match result {
                        Ok(result) => result?,
                        // The worker dropped its sender without reporting.
                        Err(_) => {
                            worker.await?;
                            return Err(SessionError::WorkerLost);
                        }
                    };

                    while let Ok(event) = events.try_recv() {
                        received += 1;
                        presenter.on_event(&event).map_err(SessionError::Presentation)?;
                    }
                    presenter.on_complete(&summary).map_err(SessionError::Presentation)?;
                    tracing::info!(events = received, "Session complete");

                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(config.completion_linger()) => {}
                    }
                    return Ok(SessionOutcome::Completed(summary));
                }
                _ = &mut settle, if !settled => {
                    settled = true;
                    if received < 2 {
                        tracing::warn!(
                            events = received,
                            "Too few samples within {}s, giving up",
                            config.settle_period_secs
                        );
                        return Ok(SessionOutcome::IdleTimeout);
                    }
                }
                _ = &mut idle => {
                    tracing::warn!(
                        events = received,
                        "No data for {}s, giving up",
                        config.idle_timeout_secs
                    );
                    return Ok(SessionOutcome::IdleTimeout);
                }
                _ = ticker.tick() => {
                    presenter.on_tick().map_err(SessionError::Presentation)?;
                }
            }
        }
    }
}
