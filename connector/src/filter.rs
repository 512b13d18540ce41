//! Client-side content acceptance matching.
//!
//! The server-side `track`/`locations` filter reduces what the stream
//! delivers, but the connector applies its own acceptance check before
//! emitting: a configured pattern matched as a substring against the
//! message text, the author handle, or any extracted URL. The pattern is
//! independent of the server-side track keywords.

use crate::types::NormalizedEvent;

/// Substring matcher over the content-bearing fields of an event.
///
/// # Example
///
/// ```
/// use tweetflume_connector::filter::ContentMatcher;
/// # use tweetflume_connector::types::EventBuilder;
/// # use chrono::Utc;
///
/// let matcher = ContentMatcher::new("artsmia");
/// # let event = EventBuilder::new(
/// #     Utc::now(),
/// #     "visiting artsmia today".to_string(),
/// #     "somebody".to_string(),
/// #     "web".to_string(),
/// #     false,
/// #     "http://twitter.com/somebody/status/1".to_string(),
/// # ).build();
/// assert!(matcher.matches(&event));
/// ```
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    pattern: String,
}

impl ContentMatcher {
    /// Creates a matcher for the given pattern.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Returns the configured pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the pattern occurs in the message text, the author
    /// handle, or any extracted URL.
    #[must_use]
    pub fn matches(&self, event: &NormalizedEvent) -> bool {
        event.message.contains(&self.pattern)
            || event.user.contains(&self.pattern)
            || event
                .urls
                .as_ref()
                .is_some_and(|urls| urls.iter().any(|url| url.contains(&self.pattern)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventBuilder;
    use chrono::{DateTime, Utc};

    fn event(message: &str, user: &str, urls: Option<Vec<&str>>) -> NormalizedEvent {
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339("2014-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut builder = EventBuilder::new(
            timestamp,
            message.to_string(),
            user.to_string(),
            "web".to_string(),
            false,
            format!("http://twitter.com/{user}/status/1"),
        );
        if let Some(urls) = urls {
            builder.urls(urls.into_iter().map(str::to_string).collect());
        }
        builder.build()
    }

    #[test]
    fn matches_pattern_in_message() {
        let matcher = ContentMatcher::new("artsmia");
        assert!(matcher.matches(&event("see you at artsmia tonight", "somebody", None)));
    }

    #[test]
    fn matches_pattern_in_handle() {
        let matcher = ContentMatcher::new("artsmia");
        assert!(matcher.matches(&event("no keyword here", "artsmia_fan", None)));
    }

    #[test]
    fn matches_pattern_in_extracted_urls() {
        let matcher = ContentMatcher::new("artsmia");
        let matched = event(
            "link only",
            "somebody",
            Some(vec!["https://new.artsmia.org/exhibit"]),
        );
        assert!(matcher.matches(&matched));
    }

    #[test]
    fn rejects_when_no_field_matches() {
        let matcher = ContentMatcher::new("artsmia");
        let unmatched = event(
            "unrelated",
            "somebody",
            Some(vec!["https://example.com/page"]),
        );
        assert!(!matcher.matches(&unmatched));
    }

    #[test]
    fn rejects_when_urls_field_is_absent() {
        let matcher = ContentMatcher::new("artsmia");
        assert!(!matcher.matches(&event("unrelated", "somebody", None)));
    }

    #[test]
    fn match_is_case_sensitive() {
        let matcher = ContentMatcher::new("artsmia");
        assert!(!matcher.matches(&event("visiting ARTSMIA", "somebody", None)));
    }
}
