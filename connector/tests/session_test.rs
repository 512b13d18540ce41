//! Integration tests for the stream session loop.
//!
//! These tests drive a session with a scripted in-process transport to
//! verify ordering, discard behavior, cooperative interruption, and fatal
//! error propagation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use tweetflume_connector::error::ConnectorError;
use tweetflume_connector::filter::ContentMatcher;
use tweetflume_connector::normalize::{ContextDecorator, Decorate};
use tweetflume_connector::pipeline::Pipeline;
use tweetflume_connector::session::StreamSession;
use tweetflume_connector::sink::ChannelSink;
use tweetflume_connector::stream::{FilterSpec, StatusReceiver, StreamClient, StreamError};
use tweetflume_connector::types::{NormalizedEvent, RawStatus};

// =============================================================================
// Test Helpers
// =============================================================================

/// Transport that replays a scripted item sequence.
///
/// With `hang_after` set, the subscription stays open (silent) after the
/// script is exhausted, mimicking an idle live stream.
struct ScriptedClient {
    items: Mutex<Option<Vec<Result<RawStatus, StreamError>>>>,
    hang_after: bool,
}

impl ScriptedClient {
    fn new(items: Vec<Result<RawStatus, StreamError>>, hang_after: bool) -> Self {
        Self {
            items: Mutex::new(Some(items)),
            hang_after,
        }
    }
}

#[async_trait]
impl StreamClient for ScriptedClient {
    async fn subscribe(&self, _filter: &FilterSpec) -> Result<StatusReceiver, StreamError> {
        let items = self.items.lock().unwrap().take().unwrap_or_default();
        let hang = self.hang_after;
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            for item in items {
                if tx.send(item).await.is_err() {
                    return;
                }
            }
            if hang {
                // Keep the subscription open without yielding items.
                std::future::pending::<()>().await;
            }
        });

        Ok(rx)
    }
}

fn status(id: u64, text: &str) -> RawStatus {
    serde_json::from_value(json!({
        "created_at": "Sat Mar 01 12:00:00 +0000 2014",
        "id": id,
        "text": text,
        "user": {"screen_name": "somebody"},
        "source": "web"
    }))
    .unwrap()
}

fn pipeline(pattern: Option<&str>) -> Pipeline {
    let decorator: Box<dyn Decorate> =
        Box::new(ContextDecorator::with_host("test-host".to_string(), Vec::new()));
    Pipeline::new(None, pattern.map(ContentMatcher::new), decorator)
}

/// Spawns a session over the scripted items, returning the event receiver,
/// the shutdown trigger, and the session handle.
fn spawn_session(
    items: Vec<Result<RawStatus, StreamError>>,
    hang_after: bool,
    pattern: Option<&str>,
) -> (
    mpsc::Receiver<NormalizedEvent>,
    watch::Sender<bool>,
    tokio::task::JoinHandle<Result<(), ConnectorError>>,
) {
    let client = ScriptedClient::new(items, hang_after);
    let session = StreamSession::new(client, FilterSpec::new(Vec::new(), None), pipeline(pattern));

    let (event_tx, event_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut sink = ChannelSink::new(event_tx);
        session.run(&mut sink, shutdown_rx).await
    });

    (event_rx, shutdown_tx, handle)
}

async fn next_event(rx: &mut mpsc::Receiver<NormalizedEvent>) -> NormalizedEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed early")
}

// =============================================================================
// Ordering & Discards
// =============================================================================

/// Accepted events reach the sink in arrival order; discarded statuses
/// leave no trace in the queue.
#[tokio::test]
async fn emits_accepted_events_in_arrival_order() {
    let items = vec![
        Ok(status(1, "artsmia first")),
        Ok(status(2, "unrelated chatter")),
        Ok(status(3, "artsmia second")),
    ];
    let (mut events, shutdown, handle) = spawn_session(items, true, Some("artsmia"));

    let first = next_event(&mut events).await;
    let second = next_event(&mut events).await;
    assert_eq!(first.source, "http://twitter.com/somebody/status/1");
    assert_eq!(second.source, "http://twitter.com/somebody/status/3");

    shutdown.send(true).unwrap();
    let outcome = timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(outcome.is_ok(), "session should end cleanly: {outcome:?}");

    // Nothing else was emitted.
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn unfiltered_session_passes_everything_through() {
    let items = vec![Ok(status(1, "anything")), Ok(status(2, "at all"))];
    let (mut events, shutdown, handle) = spawn_session(items, true, None);

    assert_eq!(next_event(&mut events).await.message, "anything");
    assert_eq!(next_event(&mut events).await.message, "at all");

    shutdown.send(true).unwrap();
    assert!(timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap()
        .is_ok());
}

// =============================================================================
// Interruption
// =============================================================================

/// Interruption terminates the loop without an error and without emitting
/// anything that was not already fully processed.
#[tokio::test]
async fn interruption_terminates_cleanly_without_emission() {
    let (mut events, shutdown, handle) = spawn_session(Vec::new(), true, Some("artsmia"));

    // Give the session a moment to reach its idle suspension point.
    tokio::time::sleep(Duration::from_millis(20)).await;

    shutdown.send(true).unwrap();
    let outcome = timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

    assert!(outcome.is_ok());
    assert!(events.recv().await.is_none());
}

/// Dropping the shutdown sender counts as interruption.
#[tokio::test]
async fn dropped_shutdown_sender_interrupts_the_session() {
    let (mut events, shutdown, handle) = spawn_session(Vec::new(), true, None);

    drop(shutdown);
    let outcome = timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

    assert!(outcome.is_ok());
    assert!(events.recv().await.is_none());
}

// =============================================================================
// Fatal Errors
// =============================================================================

/// A transport error mid-stream is fatal and propagates.
#[tokio::test]
async fn transport_error_aborts_the_session() {
    let items = vec![
        Ok(status(1, "fine")),
        Err(StreamError::Api {
            status: 420,
            message: "Enhance Your Calm".to_string(),
        }),
    ];
    let (mut events, _shutdown, handle) = spawn_session(items, false, None);

    assert_eq!(next_event(&mut events).await.message, "fine");

    let outcome = timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(matches!(
        outcome,
        Err(ConnectorError::Stream(StreamError::Api { status: 420, .. }))
    ));
}

/// A remote close (channel drained and dropped) is fatal.
#[tokio::test]
async fn remote_close_aborts_the_session() {
    let (_events, _shutdown, handle) = spawn_session(Vec::new(), false, None);

    let outcome = timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(matches!(
        outcome,
        Err(ConnectorError::Stream(StreamError::Disconnected))
    ));
}

/// Data-quality failures surface upward instead of being defaulted away.
#[tokio::test]
async fn malformed_status_aborts_the_session() {
    let mut bad = status(1, "fine text");
    bad.created_at = "not a timestamp".to_string();

    let (_events, _shutdown, handle) = spawn_session(vec![Ok(bad)], true, None);

    let outcome = timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(matches!(outcome, Err(ConnectorError::Normalize(_))));
}
