#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use roomwatch::components::room_calendar::{CalendarEvent, CalendarProvider, ProviderResult};
use roomwatch::error::ProviderError;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted behavior of one room
#[derive(Debug, Default)]
struct RoomScript {
    events: Vec<CalendarEvent>,
    delay: Option<Duration>,
    failures: VecDeque<ProviderError>,
    permanent_failure: Option<ProviderError>,
    fetches: usize,
}

/// Mock calendar provider with per-room scripted results, delays and failures.
///
/// Reservations are recorded and show up in later fetches.
#[derive(Debug, Default)]
pub struct MockCalendarProvider {
    rooms: Mutex<HashMap<String, RoomScript>>,
    created: Mutex<Vec<(String, String, DateTime<Utc>, DateTime<Utc>)>>,
    create_failure: Mutex<Option<ProviderError>>,
}

impl MockCalendarProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a room with its events
    pub fn with_room(self, room: &str, events: Vec<CalendarEvent>) -> Self {
        self.rooms.lock().unwrap().insert(
            room.to_string(),
            RoomScript {
                events,
                ..Default::default()
            },
        );
        self
    }

    /// Delay every fetch of `room`
    pub fn with_delay(self, room: &str, delay: Duration) -> Self {
        self.script(room, |s| s.delay = Some(delay));
        self
    }

    /// Fail the next fetch of `room` once per queued error
    pub fn with_failures(self, room: &str, failures: Vec<ProviderError>) -> Self {
        self.script(room, |s| s.failures.extend(failures));
        self
    }

    /// Fail every fetch of `room`
    pub fn with_permanent_failure(self, room: &str, error: ProviderError) -> Self {
        self.script(room, |s| s.permanent_failure = Some(error));
        self
    }

    /// Fail every write
    pub fn with_create_failure(self, error: ProviderError) -> Self {
        *self.create_failure.lock().unwrap() = Some(error);
        self
    }

    /// Number of fetches issued for `room`
    pub fn fetches(&self, room: &str) -> usize {
        self.rooms
            .lock()
            .unwrap()
            .get(room)
            .map(|s| s.fetches)
            .unwrap_or(0)
    }

    /// Reservations written so far as (room, requester, start, end)
    pub fn created(&self) -> Vec<(String, String, DateTime<Utc>, DateTime<Utc>)> {
        self.created.lock().unwrap().clone()
    }

    fn script(&self, room: &str, update: impl FnOnce(&mut RoomScript)) {
        let mut rooms = self.rooms.lock().unwrap();
        update(rooms.entry(room.to_string()).or_default());
    }
}

#[async_trait]
impl CalendarProvider for MockCalendarProvider {
    async fn fetch_events(
        &self,
        room: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: usize,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let (delay, result) = {
            let mut rooms = self.rooms.lock().unwrap();
            let script = rooms
                .get_mut(room)
                .ok_or_else(|| ProviderError::InvalidRoom(room.to_string()))?;
            script.fetches += 1;

            let result = if let Some(error) = script.failures.pop_front() {
                Err(error)
            } else if let Some(error) = &script.permanent_failure {
                Err(error.clone())
            } else {
                let mut events: Vec<CalendarEvent> = script
                    .events
                    .iter()
                    .filter(|e| e.overlaps(window_start, window_end))
                    .cloned()
                    .collect();
                events.sort_by_key(|e| e.start);
                events.truncate(limit);
                Ok(events)
            };
            (script.delay, result)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn create_event(
        &self,
        room: &str,
        requester: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<()> {
        if let Some(error) = self.create_failure.lock().unwrap().clone() {
            return Err(error);
        }

        let mut rooms = self.rooms.lock().unwrap();
        let script = rooms
            .get_mut(room)
            .ok_or_else(|| ProviderError::InvalidRoom(room.to_string()))?;
        script.events.push(event(requester, start, end));
        self.created
            .lock()
            .unwrap()
            .push((room.to_string(), requester.to_string(), start, end));
        Ok(())
    }
}

/// 2 March 2026 at `hour:minute` UTC
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

/// An event without subject or email
pub fn event(organizer: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        organizer_name: organizer.to_string(),
        organizer_email: String::new(),
        subject: String::new(),
        start,
        end,
        recurring: false,
        show_as: None,
    }
}

pub fn rooms(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
