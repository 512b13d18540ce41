//! Stream transport: filter specification and the HTTP streaming client.
//!
//! [`HttpStreamClient`] holds the long-lived connection to the filtered
//! stream endpoint. It POSTs the server-side filter parameters with an
//! OAuth-signed request and frames the chunked response body into
//! newline-delimited JSON statuses on a background task that feeds a
//! bounded channel. Keep-alive blank lines and non-status control frames
//! (`delete`, `limit`, ...) are skipped at the transport layer.
//!
//! No reconnection is attempted here: transport failures and a remote
//! close both end the subscription with a fatal [`StreamError`], and the
//! one tolerated termination path (operator interruption) is handled by
//! the session loop above this layer.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::oauth::OAuthSigner;
use crate::types::RawStatus;

/// Path of the filtered stream endpoint.
const FILTER_ENDPOINT: &str = "/1.1/statuses/filter.json";

/// Capacity of the channel between the framing task and the session loop.
const STATUS_CHANNEL_CAPACITY: usize = 256;

/// Connect timeout for the initial subscription request.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Top-level keys that identify non-status control frames on the stream.
const CONTROL_KEYS: &[&str] = &[
    "delete",
    "scrub_geo",
    "limit",
    "status_withheld",
    "user_withheld",
    "disconnect",
    "warning",
];

/// Errors that can occur on the stream transport.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The HTTP request or body read failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint rejected the subscription.
    #[error("stream rejected with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The remote closed the stream.
    #[error("stream closed by remote")]
    Disconnected,
}

/// Server-side filter specification for one stream session.
///
/// Constructed once at startup and immutable for the session lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Keywords for the `track` parameter, joined with commas on the wire.
    pub track_keywords: Vec<String>,

    /// Bounding box string for the `locations` parameter, sent verbatim.
    pub location: Option<String>,
}

impl FilterSpec {
    /// Creates a filter specification.
    #[must_use]
    pub fn new(track_keywords: Vec<String>, location: Option<String>) -> Self {
        Self {
            track_keywords,
            location,
        }
    }

    /// Returns true when neither keyword nor location filtering is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.track_keywords.is_empty() && self.location.is_none()
    }

    /// Renders the wire parameters for the subscription request.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.track_keywords.is_empty() {
            params.push(("track", self.track_keywords.join(",")));
        }
        if let Some(location) = &self.location {
            params.push(("locations", location.clone()));
        }
        params
    }
}

/// Receiver half of a stream subscription.
pub type StatusReceiver = mpsc::Receiver<Result<RawStatus, StreamError>>;

/// The external streaming-client capability consumed by the session loop.
///
/// The trait is the seam for tests: a scripted implementation can replace
/// the network entirely.
#[async_trait]
pub trait StreamClient: Send + Sync {
    /// Opens a filtered subscription and returns the status receiver.
    async fn subscribe(&self, filter: &FilterSpec) -> Result<StatusReceiver, StreamError>;
}

/// HTTP streaming client for the filtered stream endpoint.
pub struct HttpStreamClient {
    client: reqwest::Client,
    signer: OAuthSigner,
    stream_url: String,
}

impl HttpStreamClient {
    /// Creates a client from the connector configuration.
    ///
    /// The underlying HTTP client sets a connect timeout but no overall
    /// request timeout: the stream is expected to stay open indefinitely.
    ///
    /// # Errors
    ///
    /// Returns a `StreamError` if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, StreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            signer: OAuthSigner::new(config),
            stream_url: config.stream_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StreamClient for HttpStreamClient {
    async fn subscribe(&self, filter: &FilterSpec) -> Result<StatusReceiver, StreamError> {
        let url = format!("{}{}", self.stream_url, FILTER_ENDPOINT);
        let params = filter.params();
        let authorization = self.signer.authorization_header("POST", &url, &params);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StreamError::Api { status, message });
        }

        info!(url = %url, "connected to filtered stream");

        let (status_tx, status_rx) = mpsc::channel(STATUS_CHANNEL_CAPACITY);
        tokio::spawn(read_stream(response, status_tx));

        Ok(status_rx)
    }
}

/// Reads the chunked response body, frames it into lines, and forwards
/// parsed statuses until the stream ends or the receiver is dropped.
async fn read_stream(
    response: reqwest::Response,
    status_tx: mpsc::Sender<Result<RawStatus, StreamError>>,
) {
    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = status_tx.send(Err(StreamError::Transport(e))).await;
                return;
            }
        };

        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let raw_line: Vec<u8> = buffer.drain(..=newline).collect();
            let text = String::from_utf8_lossy(&raw_line);
            let line = text.trim();

            if line.is_empty() {
                trace!("keep-alive");
                continue;
            }

            match classify_frame(line) {
                Frame::Status(status) => {
                    if status_tx.send(Ok(status)).await.is_err() {
                        debug!("status receiver dropped, stopping stream read");
                        return;
                    }
                }
                Frame::Control(kind) => {
                    debug!(kind, "skipping control frame");
                }
                Frame::Garbage(error) => {
                    warn!(error = %error, "skipping unparsable frame");
                }
            }
        }
    }

    let _ = status_tx.send(Err(StreamError::Disconnected)).await;
}

/// One framed line of the stream body.
enum Frame {
    /// A status item.
    Status(RawStatus),

    /// A recognized non-status control frame.
    Control(&'static str),

    /// A line that parses as neither.
    Garbage(serde_json::Error),
}

/// Classifies one non-empty line of the stream body.
fn classify_frame(line: &str) -> Frame {
    match serde_json::from_str::<RawStatus>(line) {
        Ok(status) => Frame::Status(status),
        Err(error) => {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                if let Some(kind) = CONTROL_KEYS
                    .iter()
                    .copied()
                    .find(|key| value.get(key).is_some())
                {
                    return Frame::Control(kind);
                }
            }
            Frame::Garbage(error)
        }
    }
}
