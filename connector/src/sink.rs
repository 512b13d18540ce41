//! Downstream event sinks.
//!
//! The connector's only contract with its downstream is [`EventSink`]: one
//! blocking accept per event, pushes arriving in acceptance order. Two
//! implementations are provided: a bounded channel (the queue boundary the
//! binary uses) and a JSON-lines writer (the queue's consumer end).

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::types::NormalizedEvent;

/// Errors that can occur while emitting an event.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The downstream queue is no longer accepting events.
    #[error("downstream queue closed")]
    Closed,

    /// The event could not be serialized.
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the event failed.
    #[error("failed to write event: {0}")]
    Io(#[from] std::io::Error),
}

/// A downstream consumer of normalized events.
#[async_trait]
pub trait EventSink: Send {
    /// Accepts one event, blocking until the downstream has taken it.
    async fn accept(&mut self, event: NormalizedEvent) -> Result<(), SinkError>;
}

/// Sink that pushes events into a bounded channel.
///
/// Sends block when the channel is full, which keeps the session loop from
/// outrunning the downstream consumer while preserving order.
pub struct ChannelSink {
    sender: mpsc::Sender<NormalizedEvent>,
}

impl ChannelSink {
    /// Creates a sink over the sending half of an event channel.
    #[must_use]
    pub fn new(sender: mpsc::Sender<NormalizedEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn accept(&mut self, event: NormalizedEvent) -> Result<(), SinkError> {
        self.sender.send(event).await.map_err(|_| SinkError::Closed)
    }
}

/// Sink that writes each event as one JSON line.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Creates a sink over an async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EventSink for JsonLinesSink<W> {
    async fn accept(&mut self, event: NormalizedEvent) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
