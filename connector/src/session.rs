//! The stream session: one long-lived consumer loop per subscription.
//!
//! A session drives a [`StreamClient`] subscription through the
//! [`Pipeline`] and into an [`EventSink`], one status at a time: each item
//! is fully normalized, evaluated, and (when accepted) emitted before the
//! next one is taken, so emission order always matches arrival order.
//!
//! Termination:
//! - the shutdown signal fires → the loop exits cleanly with `Ok(())`,
//!   never mid-item, so no partially-built event crosses the sink boundary
//! - the transport fails or the remote closes → the error propagates as
//!   fatal; a new session must be created to resume
//! - a data-quality error from normalization → fatal, reported upward

use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::error::ConnectorError;
use crate::pipeline::Pipeline;
use crate::sink::EventSink;
use crate::stream::{FilterSpec, StreamClient, StreamError};

/// A single stream session over one filtered subscription.
pub struct StreamSession<C: StreamClient> {
    client: C,
    filter: FilterSpec,
    pipeline: Pipeline,
}

impl<C: StreamClient> StreamSession<C> {
    /// Creates a session.
    ///
    /// The filter specification is immutable for the session's lifetime;
    /// resuming after any termination means building a new session.
    #[must_use]
    pub fn new(client: C, filter: FilterSpec, pipeline: Pipeline) -> Self {
        Self {
            client,
            filter,
            pipeline,
        }
    }

    /// Runs the session until interruption or a fatal error.
    ///
    /// `shutdown` is the cooperative interruption signal: when it changes
    /// (or its sender is dropped) the loop terminates cleanly between
    /// items and returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectorError`] for transport failures, a remote
    /// close, data-quality failures during normalization, or a closed
    /// sink. No error recovery is attempted at this level.
    pub async fn run<S: EventSink>(
        &self,
        sink: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ConnectorError> {
        info!(
            track = ?self.filter.track_keywords,
            location = ?self.filter.location,
            "starting stream session"
        );

        let mut statuses = self.client.subscribe(&self.filter).await?;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as an interruption too.
                    let _ = changed;
                    info!("stream session interrupted");
                    return Ok(());
                }
                item = statuses.recv() => {
                    match item {
                        Some(Ok(raw)) => {
                            debug!(id = raw.id, user = %raw.user.screen_name, "received status");
                            let evaluation = self.pipeline.evaluate(&raw)?;
                            if evaluation.accepted {
                                sink.accept(evaluation.event).await?;
                            } else {
                                trace!(id = raw.id, "discarded");
                            }
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(StreamError::Disconnected.into()),
                    }
                }
            }
        }
    }
}
