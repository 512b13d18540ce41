//! Status-to-event normalization.
//!
//! This module implements the pure transformation from one [`RawStatus`] to
//! one [`NormalizedEvent`]:
//!
//! 1. `created_at` parsed with the v1.1 timestamp format, normalized to UTC
//! 2. full status text (never the truncated form when a fuller one exists)
//! 3. author handle, client label, retweet flag, canonical status URL
//! 4. decoration hook ([`Decorate`]) applied to the in-progress event
//! 5. `in-reply-to` set only for replies
//! 6. entity lists mapped through a fixed extractor per category, with
//!    empty lists producing omitted fields
//! 7. `latlng` recorded when the status is geotagged and a location filter
//!    is configured, independent of the geofence outcome
//!
//! Malformed timestamps and missing required fields surface as
//! [`NormalizeError`]; they are never silently defaulted.

use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use crate::types::{EventBuilder, NormalizedEvent, RawStatus};

/// Timestamp format used by the v1.1 streaming API,
/// e.g. `Wed Aug 27 13:08:45 +0000 2008`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Errors that can occur during normalization.
///
/// These are data-quality errors on items that already look like statuses;
/// they are reported upward rather than patched over.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The creation timestamp could not be parsed.
    #[error("status {id} has unparseable timestamp '{value}': {source}")]
    Timestamp {
        id: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A required field was absent in every form.
    #[error("status {id} is missing required field '{field}'")]
    MissingField { id: u64, field: &'static str },
}

/// Decoration hook invoked once per event before emission eligibility is
/// decided.
///
/// Adds process-wide contextual fields to the in-progress event. Injected
/// so tests can substitute it.
pub trait Decorate: Send + Sync {
    /// Adds decoration fields to the event under construction.
    fn decorate(&self, event: &mut EventBuilder);
}

/// Default decorator: stamps the host name and any configured tags.
#[derive(Debug, Clone)]
pub struct ContextDecorator {
    host: String,
    tags: Vec<String>,
}

impl ContextDecorator {
    /// Creates a decorator using the system hostname.
    #[must_use]
    pub fn new(tags: Vec<String>) -> Self {
        let host = gethostname::gethostname()
            .into_string()
            .unwrap_or_else(|_| "unknown".to_string());
        Self::with_host(host, tags)
    }

    /// Creates a decorator with an explicit host name.
    #[must_use]
    pub fn with_host(host: String, tags: Vec<String>) -> Self {
        Self { host, tags }
    }
}

impl Decorate for ContextDecorator {
    fn decorate(&self, event: &mut EventBuilder) {
        event.insert("host", json!(self.host));
        if !self.tags.is_empty() {
            event.insert("tags", json!(self.tags));
        }
    }
}

/// Pure status-to-event normalizer.
pub struct Normalizer {
    location_configured: bool,
    decorator: Box<dyn Decorate>,
}

impl Normalizer {
    /// Creates a normalizer.
    ///
    /// `location_configured` controls whether geotagged statuses get a
    /// `latlng` field; the value itself comes from whether a location
    /// filter was configured for the session.
    #[must_use]
    pub fn new(location_configured: bool, decorator: Box<dyn Decorate>) -> Self {
        Self {
            location_configured,
            decorator,
        }
    }

    /// Normalizes one raw status into an event.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] when the timestamp cannot be parsed or a
    /// required field (text, client label) is absent.
    pub fn normalize(&self, raw: &RawStatus) -> Result<NormalizedEvent, NormalizeError> {
        let timestamp = DateTime::parse_from_str(&raw.created_at, CREATED_AT_FORMAT)
            .map_err(|source| NormalizeError::Timestamp {
                id: raw.id,
                value: raw.created_at.clone(),
                source,
            })?
            .with_timezone(&Utc);

        let message = raw
            .message()
            .ok_or(NormalizeError::MissingField {
                id: raw.id,
                field: "text",
            })?
            .to_string();

        let client = raw
            .source
            .clone()
            .ok_or(NormalizeError::MissingField {
                id: raw.id,
                field: "source",
            })?;

        let handle = raw.user.screen_name.clone();
        let status_url = format!("http://twitter.com/{}/status/{}", handle, raw.id);

        let mut event = EventBuilder::new(
            timestamp,
            message,
            handle,
            client,
            raw.retweeted,
            status_url,
        );

        self.decorator.decorate(&mut event);

        if let Some(reply_to) = raw.in_reply_to_status_id {
            event.in_reply_to(reply_to);
        }

        // Fixed extractor per entity category; empty lists omit the field.
        if let Some(values) = collect(&raw.entities.media, |m| m.media_url_https.as_str()) {
            event.media(values);
        }
        if let Some(values) = collect(&raw.entities.urls, |u| u.expanded_url.as_str()) {
            event.urls(values);
        }
        if let Some(values) = collect(&raw.entities.hashtags, |h| h.text.as_str()) {
            event.hashtags(values);
        }
        if let Some(values) = collect(&raw.entities.user_mentions, |m| m.screen_name.as_str()) {
            event.user_mentions(values);
        }

        if self.location_configured {
            if let Some((lat, lon)) = raw.coordinates() {
                event.latlng(lat, lon);
            }
        }

        Ok(event.build())
    }
}

/// Maps a non-empty entity list through its extractor, preserving order.
/// Empty lists yield `None` so the event field is omitted entirely.
fn collect<T>(items: &[T], extract: fn(&T) -> &str) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items.iter().map(|item| extract(item).to_string()).collect())
    }
}
