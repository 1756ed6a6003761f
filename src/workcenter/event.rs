//! Work log entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in a day's work log.
///
/// Stored as `<id>.json` in the bucket of `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Calendar day the event belongs to
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl EventInfo {
    /// New event with a fresh id, created now
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            date,
            created_at: Utc::now(),
        }
    }

    /// Document id within the day bucket
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }
}
