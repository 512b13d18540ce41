//! Raw status wire types and the normalized event record.
//!
//! [`RawStatus`] mirrors the subset of the v1.1 streaming status JSON this
//! connector cares about. It is immutable once received and its lifetime
//! ends at normalization. [`NormalizedEvent`] is the record handed to the
//! downstream queue; it is assembled through [`EventBuilder`] so that all
//! conditional fields (`in-reply-to`, entity lists, `latlng`, decoration)
//! are resolved before the event becomes immutable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw status item as received from the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatus {
    /// Creation time in the v1.1 format, e.g. `Wed Aug 27 13:08:45 +0000 2008`.
    pub created_at: String,

    /// Status id.
    pub id: u64,

    /// Truncated text form.
    #[serde(default)]
    pub text: Option<String>,

    /// Full text form, when the status is not truncated.
    #[serde(default)]
    pub full_text: Option<String>,

    /// Extended payload carrying the full text for truncated statuses.
    #[serde(default)]
    pub extended_tweet: Option<ExtendedTweet>,

    /// Author of the status.
    pub user: RawUser,

    /// Client label the status was posted from (raw HTML anchor).
    #[serde(default)]
    pub source: Option<String>,

    /// Whether this status is a retweet.
    #[serde(default)]
    pub retweeted: bool,

    /// Id of the status this one replies to, when it is a reply.
    #[serde(default)]
    pub in_reply_to_status_id: Option<u64>,

    /// Geotag, when the author shared a location.
    #[serde(default)]
    pub geo: Option<RawGeo>,

    /// Extracted entities; lists default to empty when absent.
    #[serde(default)]
    pub entities: RawEntities,
}

impl RawStatus {
    /// Returns the full text of the status, preferring the untruncated forms.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.extended_tweet
            .as_ref()
            .map(|extended| extended.full_text.as_str())
            .or(self.full_text.as_deref())
            .or(self.text.as_deref())
    }

    /// Returns the geo coordinate pair as (lat, lon), when present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.geo.as_ref().and_then(|geo| geo.coordinates)
    }

    /// Returns true if the status is a reply to another status.
    #[must_use]
    pub fn is_reply(&self) -> bool {
        self.in_reply_to_status_id.is_some()
    }
}

/// Extended status payload for truncated statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedTweet {
    /// The untruncated status text.
    pub full_text: String,
}

/// Status author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    /// Author id.
    #[serde(default)]
    pub id: u64,

    /// Author handle, without the leading `@`.
    pub screen_name: String,
}

/// Geotag carried by a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGeo {
    /// Coordinate pair as `[lat, lon]`.
    #[serde(default)]
    pub coordinates: Option<(f64, f64)>,
}

/// Entity lists attached to a status.
///
/// Absent lists deserialize as empty; the distinction that matters
/// downstream (omitted key vs empty sequence) is reintroduced on the
/// normalized event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntities {
    /// Media attachments (pictures, video).
    #[serde(default)]
    pub media: Vec<MediaEntity>,

    /// Links.
    #[serde(default)]
    pub urls: Vec<UrlEntity>,

    /// Hashtags.
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,

    /// Mentioned users.
    #[serde(default)]
    pub user_mentions: Vec<MentionEntity>,
}

/// A media attachment entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntity {
    /// HTTPS URL of the attachment.
    pub media_url_https: String,
}

/// A link entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlEntity {
    /// The expanded (un-shortened) URL.
    pub expanded_url: String,
}

/// A hashtag entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagEntity {
    /// Hashtag text, without the leading `#`.
    pub text: String,
}

/// A user mention entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionEntity {
    /// Mentioned handle, without the leading `@`.
    pub screen_name: String,
}

/// A normalized event record, the connector's downstream contract.
///
/// Optional fields serialize only when present: downstream consumers test
/// key presence, so an empty entity list must produce an omitted key, never
/// an empty sequence. Decoration fields added by the
/// [`Decorate`](crate::normalize::Decorate) hook are flattened into the
/// top-level object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// When the status was created, normalized to UTC.
    pub timestamp: DateTime<Utc>,

    /// Full status text.
    pub message: String,

    /// Author handle.
    pub user: String,

    /// Client label the status was posted from.
    pub client: String,

    /// Whether the status is a retweet.
    pub retweeted: bool,

    /// Canonical status URL.
    pub source: String,

    /// Id of the replied-to status, present only for replies.
    #[serde(rename = "in-reply-to", default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<u64>,

    /// Media attachment URLs, present only when the status carried media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,

    /// Expanded link URLs, present only when the status carried links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,

    /// Hashtag texts, present only when the status carried hashtags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,

    /// Mentioned handles, present only when the status carried mentions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_mentions: Option<Vec<String>>,

    /// `"lat,lon"` pair, present only when the status was geotagged and
    /// location filtering is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<String>,

    /// Decoration fields, flattened into the event object.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Builder for [`NormalizedEvent`].
///
/// The builder exists so that the decoration hook and the conditional
/// fields can be applied before the event is finalized; once [`build`]
/// returns, the event is immutable.
///
/// [`build`]: EventBuilder::build
#[derive(Debug)]
pub struct EventBuilder {
    event: NormalizedEvent,
}

impl EventBuilder {
    /// Creates a builder with the unconditional event fields.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        message: String,
        user: String,
        client: String,
        retweeted: bool,
        source: String,
    ) -> Self {
        Self {
            event: NormalizedEvent {
                timestamp,
                message,
                user,
                client,
                retweeted,
                source,
                in_reply_to: None,
                media: None,
                urls: None,
                hashtags: None,
                user_mentions: None,
                latlng: None,
                extra: BTreeMap::new(),
            },
        }
    }

    /// Marks the event as a reply to the given status id.
    pub fn in_reply_to(&mut self, id: u64) -> &mut Self {
        self.event.in_reply_to = Some(id);
        self
    }

    /// Sets the media attachment URLs.
    pub fn media(&mut self, values: Vec<String>) -> &mut Self {
        self.event.media = Some(values);
        self
    }

    /// Sets the expanded link URLs.
    pub fn urls(&mut self, values: Vec<String>) -> &mut Self {
        self.event.urls = Some(values);
        self
    }

    /// Sets the hashtag texts.
    pub fn hashtags(&mut self, values: Vec<String>) -> &mut Self {
        self.event.hashtags = Some(values);
        self
    }

    /// Sets the mentioned handles.
    pub fn user_mentions(&mut self, values: Vec<String>) -> &mut Self {
        self.event.user_mentions = Some(values);
        self
    }

    /// Records the raw coordinate pair on the event.
    pub fn latlng(&mut self, lat: f64, lon: f64) -> &mut Self {
        self.event.latlng = Some(format!("{lat},{lon}"));
        self
    }

    /// Adds a decoration field to the event.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.event.extra.insert(key.into(), value);
        self
    }

    /// Finalizes the event.
    #[must_use]
    pub fn build(self) -> NormalizedEvent {
        self.event
    }
}
