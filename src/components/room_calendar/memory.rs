use super::models::{CalendarEvent, ShowAs};
use super::provider::{CalendarProvider, ProviderResult};
use crate::error::{BotResult, ProviderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Calendar fixture file layout
#[derive(Debug, Deserialize)]
struct CalendarFixture {
    #[serde(default)]
    events: Vec<FixtureEvent>,
}

#[derive(Debug, Deserialize)]
struct FixtureEvent {
    room: String,
    organizer_name: String,
    #[serde(default)]
    organizer_email: String,
    #[serde(default)]
    subject: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    recurring: bool,
    #[serde(default)]
    show_as: Option<ShowAs>,
}

/// Calendar provider that keeps every room's events in memory
#[derive(Debug)]
pub struct InMemoryCalendar {
    events: RwLock<HashMap<String, Vec<CalendarEvent>>>,
    reservation_subject: String,
}

impl InMemoryCalendar {
    /// Create an empty calendar for the given rooms
    pub fn new(rooms: &[String]) -> Self {
        Self {
            events: RwLock::new(room_map(rooms)),
            reservation_subject: "Room reservation".to_string(),
        }
    }

    /// Set the subject given to events created by reservations
    pub fn with_reservation_subject(mut self, subject: &str) -> Self {
        self.reservation_subject = subject.to_string();
        self
    }

    /// Build a calendar from TOML fixture content.
    ///
    /// Events for rooms outside `rooms` are skipped.
    pub fn from_fixture(rooms: &[String], content: &str) -> BotResult<Self> {
        let fixture: CalendarFixture = toml::from_str(content)?;
        let mut map = room_map(rooms);

        for entry in fixture.events {
            let room = entry.room.trim().to_lowercase();
            let Some(events) = map.get_mut(&room) else {
                warn!("Skipping fixture event for unknown room '{}'", entry.room);
                continue;
            };
            events.push(CalendarEvent {
                organizer_name: entry.organizer_name,
                organizer_email: entry.organizer_email,
                subject: entry.subject,
                start: entry.start,
                end: entry.end,
                recurring: entry.recurring,
                show_as: entry.show_as,
            });
        }

        Ok(Self {
            events: RwLock::new(map),
            ..Self::new(&[])
        })
    }

    /// Load a fixture file, or start empty if it does not exist
    pub fn load(rooms: &[String], path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Calendar file {} not found, starting with empty calendars",
                path.display()
            );
            return Ok(Self::new(rooms));
        }

        let content = fs::read_to_string(path)?;
        let calendar = Self::from_fixture(rooms, &content)?;
        info!("Loaded calendar fixture from {}", path.display());
        Ok(calendar)
    }

    /// Add an event to a room's calendar
    pub async fn insert(&self, room: &str, event: CalendarEvent) -> ProviderResult<()> {
        let mut map = self.events.write().await;
        let events = map
            .get_mut(&room.to_lowercase())
            .ok_or_else(|| ProviderError::InvalidRoom(room.to_string()))?;
        events.push(event);
        Ok(())
    }
}

fn room_map(rooms: &[String]) -> HashMap<String, Vec<CalendarEvent>> {
    rooms
        .iter()
        .map(|room| (room.trim().to_lowercase(), Vec::new()))
        .collect()
}

#[async_trait]
impl CalendarProvider for InMemoryCalendar {
    async fn fetch_events(
        &self,
        room: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: usize,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let map = self.events.read().await;
        let events = map
            .get(&room.to_lowercase())
            .ok_or_else(|| ProviderError::InvalidRoom(room.to_string()))?;

        let mut matching: Vec<CalendarEvent> = events
            .iter()
            .filter(|e| e.overlaps(window_start, window_end))
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.start);
        matching.truncate(limit);

        debug!("Fetched {} events for room {}", matching.len(), room);
        Ok(matching)
    }

    async fn create_event(
        &self,
        room: &str,
        requester: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<()> {
        let event = CalendarEvent {
            organizer_name: requester.to_string(),
            organizer_email: requester.to_string(),
            subject: self.reservation_subject.clone(),
            start,
            end,
            recurring: false,
            show_as: Some(ShowAs::Busy),
        };
        self.insert(room, event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"
[[events]]
room = "Everest"
organizer_name = "Aino"
organizer_email = "aino@example.com"
subject = "Planning"
start = "2026-03-02T10:00:00Z"
end = "2026-03-02T11:00:00Z"

[[events]]
room = "everest"
organizer_name = "Pekka"
subject = "Review"
start = "2026-03-02T08:00:00Z"
end = "2026-03-02T09:00:00Z"
show_as = "tentative"

[[events]]
room = "denali"
organizer_name = "Nobody"
start = "2026-03-02T08:00:00Z"
end = "2026-03-02T09:00:00Z"
"#;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    fn rooms() -> Vec<String> {
        vec!["everest".to_string(), "k2".to_string()]
    }

    #[tokio::test]
    async fn test_fixture_events_sorted_and_windowed() {
        let calendar = InMemoryCalendar::from_fixture(&rooms(), FIXTURE).unwrap();

        let events = calendar
            .fetch_events("everest", at(0), at(23), 10)
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].organizer_name, "Pekka");
        assert_eq!(events[0].show_as, Some(ShowAs::Tentative));
        assert_eq!(events[1].subject, "Planning");

        let events = calendar
            .fetch_events("everest", at(9), at(10), 10)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_limit_and_unknown_room() {
        let calendar = InMemoryCalendar::from_fixture(&rooms(), FIXTURE).unwrap();

        let events = calendar
            .fetch_events("everest", at(0), at(23), 1)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].organizer_name, "Pekka");

        let err = calendar
            .fetch_events("denali", at(0), at(23), 10)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::InvalidRoom("denali".to_string()));
    }

    #[tokio::test]
    async fn test_create_event_is_visible() {
        let calendar = InMemoryCalendar::new(&rooms()).with_reservation_subject("Booked");
        calendar
            .create_event("k2", "matti", at(13), at(14))
            .await
            .unwrap();

        let events = calendar.fetch_events("k2", at(12), at(15), 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].organizer_name, "matti");
        assert_eq!(events[0].subject, "Booked");
    }
}
