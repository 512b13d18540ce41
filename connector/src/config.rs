//! Configuration module for the Tweetflume Connector.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TWEETFLUME_CONSUMER_KEY` | Yes | - | OAuth consumer key |
//! | `TWEETFLUME_CONSUMER_SECRET` | Yes | - | OAuth consumer secret |
//! | `TWEETFLUME_ACCESS_TOKEN` | Yes | - | OAuth access token |
//! | `TWEETFLUME_ACCESS_TOKEN_SECRET` | Yes | - | OAuth access token secret |
//! | `TWEETFLUME_KEYWORDS` | No | - | Comma-separated keywords to track |
//! | `TWEETFLUME_LOCATION` | No | - | Bounding box `swlon,swlat,nelon,nelat` |
//! | `TWEETFLUME_CONTENT_FILTER` | No | - | Client-side acceptance substring |
//! | `TWEETFLUME_STREAM_URL` | No | `https://stream.twitter.com` | Stream endpoint base URL |
//! | `TWEETFLUME_TAGS` | No | - | Comma-separated tags stamped on every event |
//! | `TWEETFLUME_QUEUE_SIZE` | No | 1000 | Downstream queue capacity |
//!
//! A malformed `TWEETFLUME_LOCATION` fails here, at load time, rather than
//! at the first geofence check.
//!
//! # Example
//!
//! ```no_run
//! use tweetflume_connector::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Stream URL: {}", config.stream_url);
//! ```

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::geo::BoundingBox;
use crate::stream::FilterSpec;

/// Default stream endpoint base URL.
const DEFAULT_STREAM_URL: &str = "https://stream.twitter.com";

/// Default downstream queue capacity.
const DEFAULT_QUEUE_SIZE: usize = 1000;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Configuration for the Tweetflume Connector.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth consumer key.
    pub consumer_key: String,

    /// OAuth consumer secret.
    pub consumer_secret: String,

    /// OAuth access token.
    pub access_token: String,

    /// OAuth access token secret.
    pub access_token_secret: String,

    /// Keywords for the server-side `track` filter.
    /// If `None`, no keyword filter is sent.
    pub keywords: Option<Vec<String>>,

    /// Bounding box string for the server-side `locations` filter, in
    /// `swlon,swlat,nelon,nelat` order. Validated at load time; the same
    /// string is re-parsed for the client-side geofence.
    pub location: Option<String>,

    /// Client-side acceptance pattern matched against message text, author
    /// handle, and extracted URLs. If `None`, the content arm of the
    /// acceptance filter is disabled.
    pub content_filter: Option<String>,

    /// Stream endpoint base URL.
    pub stream_url: String,

    /// Tags stamped onto every event by the decoration hook.
    pub tags: Vec<String>,

    /// Capacity of the downstream event queue.
    pub queue_size: usize,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - Any of the four credential variables is unset or empty
    /// - `TWEETFLUME_LOCATION` is set but is not a valid bounding box
    /// - `TWEETFLUME_QUEUE_SIZE` is set but is not a positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        let consumer_key = require_env("TWEETFLUME_CONSUMER_KEY")?;
        let consumer_secret = require_env("TWEETFLUME_CONSUMER_SECRET")?;
        let access_token = require_env("TWEETFLUME_ACCESS_TOKEN")?;
        let access_token_secret = require_env("TWEETFLUME_ACCESS_TOKEN_SECRET")?;

        // Optional: TWEETFLUME_KEYWORDS (comma-separated)
        let keywords = env::var("TWEETFLUME_KEYWORDS").ok().map(split_list);
        let keywords = match keywords {
            Some(list) if list.is_empty() => None,
            other => other,
        };

        // Optional: TWEETFLUME_LOCATION, validated now, used verbatim later
        let location = match env::var("TWEETFLUME_LOCATION") {
            Ok(value) => {
                BoundingBox::from_str(&value).map_err(|e| ConfigError::InvalidValue {
                    key: "TWEETFLUME_LOCATION".to_string(),
                    message: e.to_string(),
                })?;
                Some(value)
            }
            Err(_) => None,
        };

        // Optional: TWEETFLUME_CONTENT_FILTER
        let content_filter = env::var("TWEETFLUME_CONTENT_FILTER")
            .ok()
            .filter(|value| !value.is_empty());

        // Optional: TWEETFLUME_STREAM_URL (default: https://stream.twitter.com)
        let stream_url =
            env::var("TWEETFLUME_STREAM_URL").unwrap_or_else(|_| DEFAULT_STREAM_URL.to_string());

        // Optional: TWEETFLUME_TAGS (comma-separated)
        let tags = env::var("TWEETFLUME_TAGS").ok().map(split_list).unwrap_or_default();

        // Optional: TWEETFLUME_QUEUE_SIZE (default: 1000, must be > 0)
        let queue_size = match env::var("TWEETFLUME_QUEUE_SIZE") {
            Ok(value) => {
                let size = value
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "TWEETFLUME_QUEUE_SIZE".to_string(),
                        message: format!("expected positive integer, got '{value}'"),
                    })?;
                if size == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TWEETFLUME_QUEUE_SIZE".to_string(),
                        message: "queue size must be greater than 0".to_string(),
                    });
                }
                size
            }
            Err(_) => DEFAULT_QUEUE_SIZE,
        };

        Ok(Self {
            consumer_key,
            consumer_secret,
            access_token,
            access_token_secret,
            keywords,
            location,
            content_filter,
            stream_url,
            tags,
            queue_size,
        })
    }

    /// Builds the immutable filter specification for a stream session.
    #[must_use]
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new(
            self.keywords.clone().unwrap_or_default(),
            self.location.clone(),
        )
    }

    /// Re-parses the configured location string into a bounding box for the
    /// client-side geofence check.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the string no longer parses; `from_env`
    /// validated it, so this only fails for hand-built configurations.
    pub fn bounding_box(&self) -> Result<Option<BoundingBox>, ConfigError> {
        self.location
            .as_deref()
            .map(|value| {
                BoundingBox::from_str(value).map_err(|e| ConfigError::InvalidValue {
                    key: "TWEETFLUME_LOCATION".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}

/// Requires a non-empty environment variable.
fn require_env(key: &str) -> Result<String, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

/// Splits a comma-separated list, trimming whitespace and dropping empties.
fn split_list(value: String) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
