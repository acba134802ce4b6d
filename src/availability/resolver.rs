use super::event_set::EventSet;
use super::reducer::reduce;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a room is in use at a reference instant, and until when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatus {
    pub room_name: String,
    pub is_in_use: bool,
    /// End of the current span when busy, start of the next event when free.
    /// `None` means free for the rest of the queried window.
    pub end_time: Option<DateTime<Utc>>,
    pub organizer_name: Option<String>,
}

/// Resolve a room's status at `reference`
pub fn resolve(events: &EventSet, reference: DateTime<Utc>) -> RoomStatus {
    let room_name = events.room().to_string();

    if let Some(span) = reduce(events, reference) {
        return RoomStatus {
            room_name,
            is_in_use: true,
            end_time: Some(span.end),
            organizer_name: Some(span.last_organizer),
        };
    }

    match events.events().iter().find(|e| e.start >= reference) {
        Some(next) => RoomStatus {
            room_name,
            is_in_use: false,
            end_time: Some(next.start),
            organizer_name: Some(next.organizer_name.clone()),
        },
        None => RoomStatus {
            room_name,
            is_in_use: false,
            end_time: None,
            organizer_name: None,
        },
    }
}
