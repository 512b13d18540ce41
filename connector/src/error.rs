//! Error types for the Tweetflume Connector.
//!
//! Each module defines its own error enum; this module unifies them into
//! the error type the session loop and binary surface to callers.

use thiserror::Error;

use crate::config::ConfigError;
use crate::normalize::NormalizeError;
use crate::sink::SinkError;
use crate::stream::StreamError;

/// Errors that can occur during connector operations.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Stream transport error.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Data-quality error while normalizing a status.
    #[error("normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Downstream emission error.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// A specialized `Result` type for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConnectorError::Config(ConfigError::MissingEnvVar(
            "TWEETFLUME_CONSUMER_KEY".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "configuration error: missing required environment variable: TWEETFLUME_CONSUMER_KEY"
        );
    }

    #[test]
    fn stream_error_display() {
        let err = ConnectorError::Stream(StreamError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "stream error: stream rejected with status 401: Unauthorized"
        );
    }

    #[test]
    fn sink_error_conversion() {
        let err: ConnectorError = SinkError::Closed.into();
        assert!(matches!(err, ConnectorError::Sink(_)));
        assert_eq!(err.to_string(), "sink error: downstream queue closed");
    }

    #[test]
    fn disconnect_error_display() {
        let err: ConnectorError = StreamError::Disconnected.into();
        assert_eq!(err.to_string(), "stream error: stream closed by remote");
    }

    #[test]
    fn error_source_chain() {
        use std::error::Error;

        let err: ConnectorError = StreamError::Disconnected.into();
        assert!(err.source().is_some());
    }
}
