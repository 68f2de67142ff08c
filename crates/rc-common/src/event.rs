//! The activity record that burst analysis runs over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a content entity (a topic, coin, article, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        ContentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        ContentId(s.to_string())
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        ContentId(s)
    }
}

/// One post/share/comment about a piece of content.
///
/// Events are immutable once built; burst membership is tracked beside
/// them rather than written into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Post identifier.
    pub id: String,
    /// When the post happened.
    pub timestamp: DateTime<Utc>,
    /// Actor who posted.
    pub user_id: String,
    /// Platform label (e.g. "twitter", "reddit").
    pub platform: String,
    /// Content entity the post is about.
    pub content_id: ContentId,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        user_id: impl Into<String>,
        platform: impl Into<String>,
        content_id: impl Into<ContentId>,
    ) -> Self {
        Event {
            id: id.into(),
            timestamp,
            user_id: user_id.into(),
            platform: platform.into(),
            content_id: content_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn content_id_serializes_as_plain_string() {
        let id = ContentId::new("bitcoin");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"bitcoin\"");
        assert_eq!(id.to_string(), "bitcoin");
    }

    #[test]
    fn event_round_trips_through_json() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let event = Event::new("p1", ts, "u1", "reddit", "ethereum");
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.content_id.as_str(), "ethereum");
    }
}
