use crate::components::room_calendar::CalendarEvent;
use crate::error::{BotResult, Error};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// A half-open UTC time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting one that ends before it starts
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> BotResult<Self> {
        if start > end {
            return Err(Error::TimeWindow(format!(
                "window starts at {} after it ends at {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `instant` falls inside `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The events governing one room's calendar within one query window.
///
/// Events are ordered by start time; events with equal starts keep the
/// order the provider returned them in. Malformed events are dropped on
/// construction.
#[derive(Debug, Clone)]
pub struct EventSet {
    room: String,
    window: TimeWindow,
    events: Vec<CalendarEvent>,
    rejected: usize,
}

impl EventSet {
    pub fn new(room: impl Into<String>, window: TimeWindow, events: Vec<CalendarEvent>) -> Self {
        let room = room.into();
        let fetched = events.len();

        let mut events: Vec<CalendarEvent> = events
            .into_iter()
            .filter(|event| match event.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Excluding event from room {}: {}", room, e);
                    false
                }
            })
            .collect();

        let outside = events
            .iter()
            .filter(|e| !e.overlaps(window.start, window.end) && !window.contains(e.start))
            .count();
        if outside > 0 {
            debug!(
                "Room {} returned {} events outside {} - {}",
                room, outside, window.start, window.end
            );
        }

        // Stable, so equal starts keep provider order
        events.sort_by_key(|e| e.start);

        let rejected = fetched - events.len();
        Self {
            room,
            window,
            events,
            rejected,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Valid events, ordered by start
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of malformed events excluded on construction
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn event(organizer: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            organizer_name: organizer.to_string(),
            organizer_email: format!("{}@example.com", organizer.to_lowercase()),
            subject: String::new(),
            start,
            end,
            recurring: false,
            show_as: None,
        }
    }

    #[test]
    fn test_time_window() {
        assert!(TimeWindow::new(at(10, 0), at(9, 0)).is_err());

        let window = TimeWindow::new(at(9, 0), at(10, 0)).unwrap();
        assert!(window.contains(at(9, 0)));
        assert!(window.contains(at(9, 59)));
        assert!(!window.contains(at(10, 0)));
    }

    #[test]
    fn test_events_sorted_stably() {
        let window = TimeWindow::new(at(0, 0), at(23, 0)).unwrap();
        let set = EventSet::new(
            "everest",
            window,
            vec![
                event("Cecilia", at(11, 0), at(12, 0)),
                event("Aino", at(9, 0), at(10, 0)),
                event("Bertta", at(9, 0), at(9, 30)),
            ],
        );

        let organizers: Vec<&str> = set
            .events()
            .iter()
            .map(|e| e.organizer_name.as_str())
            .collect();
        assert_eq!(organizers, vec!["Aino", "Bertta", "Cecilia"]);
        assert_eq!(set.room(), "everest");
    }

    #[test]
    fn test_malformed_events_excluded() {
        let window = TimeWindow::new(at(0, 0), at(23, 0)).unwrap();
        let set = EventSet::new(
            "everest",
            window,
            vec![
                event("Aino", at(9, 0), at(10, 0)),
                event("Broken", at(12, 0), at(11, 0)),
            ],
        );

        assert_eq!(set.len(), 1);
        assert_eq!(set.rejected(), 1);
        assert_eq!(set.events()[0].organizer_name, "Aino");
    }

    #[test]
    fn test_events_outside_window_are_kept() {
        let window = TimeWindow::new(at(12, 0), at(13, 0)).unwrap();
        let set = EventSet::new("everest", window, vec![event("Aino", at(9, 0), at(10, 0))]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.rejected(), 0);
    }
}
