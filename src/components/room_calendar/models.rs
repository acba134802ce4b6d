use crate::error::{malformed_event_error, BotResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free/busy marker attached to a calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShowAs {
    Free,
    Tentative,
    Busy,
    Oof,
    WorkingElsewhere,
}

/// A meeting on a room's calendar, normalized to UTC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub organizer_name: String,
    pub organizer_email: String,
    #[serde(default)]
    pub subject: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub show_as: Option<ShowAs>,
}

impl CalendarEvent {
    /// Reject events whose times cannot be merged
    pub fn validate(&self) -> BotResult<()> {
        if self.start > self.end {
            return Err(malformed_event_error(&format!(
                "'{}' by {} starts at {} after it ends at {}",
                self.subject, self.organizer_name, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Whether `[start, end)` of this event overlaps `[start, end)`.
    ///
    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}
