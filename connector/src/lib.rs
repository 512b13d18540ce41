//! Tweetflume Connector - Twitter stream to normalized events.
//!
//! This crate consumes the Twitter filtered streaming endpoint and converts
//! each incoming status into a normalized event record for downstream
//! processing.
//!
//! # Overview
//!
//! The connector opens one long-lived, OAuth-signed connection to
//! `/1.1/statuses/filter.json` with optional server-side `track` and
//! `locations` filters, normalizes each received status (timestamp, text,
//! author, entities, geo), applies a client-side acceptance filter (content
//! pattern and/or geofence), and pushes accepted events to a downstream
//! queue in arrival order.
//!
//! # Modules
//!
//! - [`types`]: Raw status wire types and the normalized event record
//! - [`config`]: Configuration from environment variables
//! - [`geo`]: Bounding box parsing and strict geofence containment
//! - [`normalize`]: Status-to-event normalization and the decoration hook
//! - [`filter`]: Client-side content acceptance matching
//! - [`pipeline`]: Normalize/geofence/accept composition per status
//! - [`oauth`]: OAuth 1.0a request signing for the stream subscription
//! - [`stream`]: Stream transport (filter spec, HTTP client, line framing)
//! - [`session`]: The single-consumer stream session loop
//! - [`sink`]: Downstream event sinks (channel, JSON lines)
//! - [`error`]: Error types for connector operations

pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod normalize;
pub mod oauth;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod stream;
pub mod types;

pub use config::{Config, ConfigError};
pub use error::{ConnectorError, Result};
pub use filter::ContentMatcher;
pub use geo::{BoundingBox, GeoError};
pub use normalize::{ContextDecorator, Decorate, NormalizeError, Normalizer};
pub use oauth::OAuthSigner;
pub use pipeline::{Evaluation, Pipeline};
pub use session::StreamSession;
pub use sink::{ChannelSink, EventSink, JsonLinesSink, SinkError};
pub use stream::{FilterSpec, HttpStreamClient, StatusReceiver, StreamClient, StreamError};
pub use types::{EventBuilder, NormalizedEvent, RawStatus};
