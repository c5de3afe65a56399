// Todo item model and timestamp helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task in the collection
///
/// Serialized with camelCase keys (`id`, `text`, `completed`, `createdAt`),
/// which is the persisted wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique within a collection; derived from the creation time in milliseconds
    pub id: i64,
    /// Trimmed, never empty
    pub text: String,
    pub completed: bool,
    /// Millisecond precision, persisted as ISO-8601
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Build a fresh, incomplete item. `created_ms` is milliseconds since epoch.
    pub(crate) fn new(id: i64, text: String, created_ms: i64) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at: from_millis(created_ms),
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// `createdAt` as an RFC 3339 string with exactly three fractional digits and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let parsed = DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)?;
        // Anything finer than a millisecond would not survive the next save
        Ok(super::from_millis(parsed.timestamp_millis()))
    }
}
