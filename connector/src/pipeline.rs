//! Per-status evaluation: normalize, geofence, accept.
//!
//! The pipeline composes the normalizer, the geofence evaluator, and the
//! acceptance filter into one decision per raw status. The event is always
//! fully built (decoration, entities, `latlng`) before the accept/discard
//! decision, so a discarded event is a complete event that simply never
//! reaches the sink.

use tracing::trace;

use crate::filter::ContentMatcher;
use crate::geo::BoundingBox;
use crate::normalize::{Decorate, NormalizeError, Normalizer};
use crate::types::{NormalizedEvent, RawStatus};

/// Outcome of evaluating one raw status.
#[derive(Debug)]
pub struct Evaluation {
    /// The fully-built event, whether or not it was accepted.
    pub event: NormalizedEvent,

    /// Whether the event passed the acceptance filter.
    pub accepted: bool,
}

/// Normalization and filtering pipeline for one stream session.
///
/// Acceptance: geofence membership OR content match. An unconfigured
/// geofence contributes false; an unconfigured content pattern contributes
/// false; when neither is configured every normalized event is accepted
/// (the connector passes the server-side filter through untouched).
pub struct Pipeline {
    normalizer: Normalizer,
    bounds: Option<BoundingBox>,
    matcher: Option<ContentMatcher>,
}

impl Pipeline {
    /// Creates a pipeline.
    ///
    /// `bounds` is the client-side geofence (re-parsed from the same string
    /// that feeds the server-side `locations` filter); `matcher` is the
    /// client-side content pattern; `decorator` is the decoration hook
    /// applied to every event.
    #[must_use]
    pub fn new(
        bounds: Option<BoundingBox>,
        matcher: Option<ContentMatcher>,
        decorator: Box<dyn Decorate>,
    ) -> Self {
        Self {
            normalizer: Normalizer::new(bounds.is_some(), decorator),
            bounds,
            matcher,
        }
    }

    /// Evaluates one raw status.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] for data-quality failures (unparseable
    /// timestamp, missing required fields).
    pub fn evaluate(&self, raw: &RawStatus) -> Result<Evaluation, NormalizeError> {
        let event = self.normalizer.normalize(raw)?;

        let geofenced = match (&self.bounds, raw.coordinates()) {
            (Some(bounds), Some((lat, lon))) => bounds.contains(lat, lon),
            _ => false,
        };

        let accepted = if self.bounds.is_none() && self.matcher.is_none() {
            true
        } else {
            geofenced
                || self
                    .matcher
                    .as_ref()
                    .is_some_and(|matcher| matcher.matches(&event))
        };

        if !accepted {
            trace!(id = raw.id, "status failed acceptance filter");
        }

        Ok(Evaluation { event, accepted })
    }
}
