//! Merge a room's events into occupied spans.
//!
//! Two events chain when the next one starts at or before the running end of
//! the span. A gap of zero is not a gap; any positive gap ends the span.

use super::event_set::{EventSet, TimeWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A maximal run of time during which a room is continuously booked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Organizer of the event that sets the span's end
    pub last_organizer: String,
}

/// The occupied span covering `reference`, if the room is booked at that instant.
///
/// The span starts at the first event with `start <= reference < end` and
/// absorbs every following event that starts before the span has a free gap.
/// Nested events leave the end and organizer untouched.
pub fn reduce(events: &EventSet, reference: DateTime<Utc>) -> Option<OccupiedSpan> {
    let events = events.events();
    let first = events
        .iter()
        .position(|e| e.start <= reference && reference < e.end)?;

    let covering = &events[first];
    let mut span = OccupiedSpan {
        start: covering.start,
        end: covering.end,
        last_organizer: covering.organizer_name.clone(),
    };

    // Ordered by start, so the first positive gap ends the chain
    for next in &events[first + 1..] {
        if next.start > span.end {
            break;
        }
        if next.end > span.end {
            span.end = next.end;
            span.last_organizer = next.organizer_name.clone();
        }
    }

    Some(span)
}

/// Every occupied span of the room, clipped to `window`
pub fn busy_spans(events: &EventSet, window: TimeWindow) -> Vec<OccupiedSpan> {
    let mut spans: Vec<OccupiedSpan> = Vec::new();

    for event in events
        .events()
        .iter()
        .filter(|e| e.overlaps(window.start(), window.end()))
    {
        let start = event.start.max(window.start());
        let end = event.end.min(window.end());

        if let Some(last) = spans.last_mut() {
            if start <= last.end {
                if end > last.end {
                    last.end = end;
                    last.last_organizer = event.organizer_name.clone();
                }
                continue;
            }
        }

        spans.push(OccupiedSpan {
            start,
            end,
            last_organizer: event.organizer_name.clone(),
        });
    }

    spans
}

/// Gaps between the occupied spans inside `window`
pub fn free_slots(events: &EventSet, window: TimeWindow) -> Vec<TimeWindow> {
    let mut slots = Vec::new();
    let mut cursor = window.start();

    for span in busy_spans(events, window) {
        if cursor < span.start {
            if let Ok(slot) = TimeWindow::new(cursor, span.start) {
                slots.push(slot);
            }
        }
        cursor = cursor.max(span.end);
    }

    if cursor < window.end() {
        if let Ok(slot) = TimeWindow::new(cursor, window.end()) {
            slots.push(slot);
        }
    }

    slots
}
