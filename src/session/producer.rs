//! Decode side of a session: runs on a blocking worker.

use std::io::Read;

use flvscope_flv::FlvDecoder;
use tokio::sync::mpsc;

use super::SessionError;
use crate::analysis::{DisplayEvent, SessionSummary, SyncAnalyzer};
use crate::source::SourceError;

/// Produces the reader on the worker thread.
pub(crate) type Opener = Box<dyn FnOnce() -> Result<Box<dyn Read + Send>, SourceError> + Send>;

/// Decode the whole stream, feeding display events into `events`.
///
/// Blocks on reads and on a full queue. Returns early with the summary so
/// far if the consumer has gone away.
pub(crate) fn produce(
    open: Opener,
    window_capacity: usize,
    events: mpsc::Sender<DisplayEvent>,
) -> Result<SessionSummary, SessionError> {
    let reader = open()?;
    let mut decoder = FlvDecoder::new(reader)?;
    let mut analyzer = SyncAnalyzer::new(decoder.header().has_audio(), window_capacity);

    tracing::info!(
        audio = decoder.header().has_audio(),
        video = decoder.header().has_video(),
        "Decoding stream"
    );

    loop {
        let tag = match decoder.next_tag() {
            Ok(Some(tag)) => tag,
            Ok(None) => break,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping tag: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let header = tag.header;
        tag.finish()?;

        if let Some(event) = analyzer.observe(&header) {
            if events.blocking_send(event).is_err() {
                tracing::debug!("Event queue closed, stopping decoder");
                return Ok(analyzer.summary());
            }
        }
    }

    tracing::info!(
        tags = decoder.tags_read(),
        duration_ms = analyzer.summary().final_duration_ms,
        "Reached end of stream"
    );
    Ok(analyzer.summary())
}
