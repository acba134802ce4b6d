//! Reservation conflict checking.
//!
//! The check and the write are two separate provider calls. A booking made
//! elsewhere between them can still double-book the room; the provider has
//! no atomic reservation primitive to close that window.

use super::event_set::{EventSet, TimeWindow};
use crate::components::room_calendar::{CalendarEvent, CalendarProvider};
use crate::error::{reservation_error, BotResult, ProviderError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// A proposed booking of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRequest {
    room_name: String,
    requester_id: String,
    window: TimeWindow,
}

impl ReservationRequest {
    /// Create a request; the room and requester must be named and `start < end`
    pub fn new(
        room_name: &str,
        requester_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BotResult<Self> {
        let room_name = room_name.trim().to_lowercase();
        let requester_id = requester_id.trim().to_string();

        if room_name.is_empty() {
            return Err(reservation_error("room name is empty"));
        }
        if requester_id.is_empty() {
            return Err(reservation_error("requester is empty"));
        }
        if start >= end {
            return Err(reservation_error(&format!(
                "reservation must end after it starts ({} - {})",
                start, end
            )));
        }

        Ok(Self {
            room_name,
            requester_id,
            window: TimeWindow::new(start, end)?,
        })
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.window.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.window.end()
    }

    /// The requested time as a window
    pub fn window(&self) -> TimeWindow {
        self.window
    }
}

/// Decision for a reservation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// The provider stored the booking
    Accepted,
    /// Existing events overlap the request; nothing was written
    Conflict(Vec<CalendarEvent>),
    /// The provider could not be read or written
    Failed(ProviderError),
}

/// Events overlapping `[start, end)`. Touching endpoints are not conflicts.
pub fn find_conflicts(
    events: &EventSet,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&CalendarEvent> {
    events
        .events()
        .iter()
        .filter(|e| e.overlaps(start, end))
        .collect()
}

/// Check the room's calendar for the requested time and book it if free
pub async fn check_and_reserve(
    provider: &dyn CalendarProvider,
    request: &ReservationRequest,
    limit: usize,
) -> ReservationOutcome {
    let fetched = match provider
        .fetch_events(request.room_name(), request.start(), request.end(), limit)
        .await
    {
        Ok(events) => events,
        Err(e) => {
            warn!(
                "Could not read calendar of {} for reservation: {}",
                request.room_name(),
                e
            );
            return ReservationOutcome::Failed(e);
        }
    };

    let events = EventSet::new(request.room_name(), request.window(), fetched);
    let conflicts: Vec<CalendarEvent> = find_conflicts(&events, request.start(), request.end())
        .into_iter()
        .cloned()
        .collect();

    if !conflicts.is_empty() {
        info!(
            "Rejected reservation of {} by {} ({} - {}): {} conflicting events",
            request.room_name(),
            request.requester_id(),
            request.start(),
            request.end(),
            conflicts.len()
        );
        return ReservationOutcome::Conflict(conflicts);
    }

    match provider
        .create_event(
            request.room_name(),
            request.requester_id(),
            request.start(),
            request.end(),
        )
        .await
    {
        Ok(()) => {
            info!(
                "Reserved {} for {} ({} - {})",
                request.room_name(),
                request.requester_id(),
                request.start(),
                request.end()
            );
            ReservationOutcome::Accepted
        }
        Err(e) => {
            warn!("Failed to reserve {}: {}", request.room_name(), e);
            ReservationOutcome::Failed(e)
        }
    }
}
