//! Multi-room availability snapshots.
//!
//! Each room is fetched concurrently and resolved on its own; results are
//! collected by a single consumer, so no state is shared between fetches.
//! One room failing never fails the snapshot; it is reported next to the
//! rooms that resolved.

use super::event_set::{EventSet, TimeWindow};
use super::resolver::{resolve, RoomStatus};
use crate::components::room_calendar::{CalendarEvent, CalendarProvider, ProviderResult};
use crate::error::ProviderError;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Tuning for a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Maximum number of events fetched per room
    pub limit: usize,
    /// Deadline for the whole snapshot; rooms still in flight count as failed
    pub timeout: Option<Duration>,
    /// Extra attempts after a transient failure
    pub retries: u32,
    /// Backoff step, multiplied by the attempt number
    pub retry_backoff: Duration,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            limit: 30,
            timeout: Some(Duration::from_secs(10)),
            retries: 1,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Why a room is missing from a snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    #[error(transparent)]
    Provider(ProviderError),
    #[error("Timed out waiting for the calendar provider")]
    TimedOut,
}

/// A room that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomFailure {
    pub room_name: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: FailureReason,
}

fn serialize_reason<S: Serializer>(reason: &FailureReason, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&reason.to_string())
}

/// Point-in-time availability across a set of rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub reference: DateTime<Utc>,
    pub window: TimeWindow,
    /// Sorted by room name
    pub statuses: Vec<RoomStatus>,
    /// Sorted by room name
    pub failures: Vec<RoomFailure>,
}

impl Snapshot {
    /// Whether every requested room was resolved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve every room in `rooms` at `reference`, fetching events for `window`.
///
/// Room identifiers are normalized to lower case and deduplicated. The output
/// order never depends on the order fetches complete in.
pub async fn snapshot(
    provider: &dyn CalendarProvider,
    rooms: &[String],
    window: TimeWindow,
    reference: DateTime<Utc>,
    options: &SnapshotOptions,
) -> Snapshot {
    let rooms: BTreeSet<String> = rooms
        .iter()
        .map(|room| room.trim().to_lowercase())
        .filter(|room| !room.is_empty())
        .collect();

    debug!("Taking snapshot of {} rooms at {}", rooms.len(), reference);

    let mut in_flight: FuturesUnordered<_> = rooms
        .iter()
        .map(|room| async move {
            let result = fetch_with_retry(provider, room, window, options).await;
            (room.clone(), result)
        })
        .collect();

    // A deadline too far out to represent means no deadline
    let deadline = options
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout));
    let mut pending = rooms.clone();
    let mut statuses = BTreeMap::new();
    let mut failures = BTreeMap::new();

    loop {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline, in_flight.next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(
                        "Snapshot timed out with {} rooms still pending",
                        pending.len()
                    );
                    break;
                }
            },
            None => in_flight.next().await,
        };

        let Some((room, result)) = next else {
            break;
        };
        pending.remove(&room);

        match result {
            Ok(events) => {
                let events = EventSet::new(room.clone(), window, events);
                statuses.insert(room, resolve(&events, reference));
            }
            Err(e @ ProviderError::Authentication(_)) => {
                warn!("Calendar provider rejected credentials for room {}: {}", room, e);
                failures.insert(room, FailureReason::Provider(e));
            }
            Err(e) => {
                warn!("Failed to fetch events for room {}: {}", room, e);
                failures.insert(room, FailureReason::Provider(e));
            }
        }
    }

    // Dropping the remaining futures cancels their fetches
    drop(in_flight);
    for room in pending {
        failures.insert(room, FailureReason::TimedOut);
    }

    info!(
        "Snapshot resolved {} rooms, {} failed",
        statuses.len(),
        failures.len()
    );

    Snapshot {
        reference,
        window,
        statuses: statuses.into_values().collect(),
        failures: failures
            .into_iter()
            .map(|(room_name, reason)| RoomFailure { room_name, reason })
            .collect(),
    }
}

async fn fetch_with_retry(
    provider: &dyn CalendarProvider,
    room: &str,
    window: TimeWindow,
    options: &SnapshotOptions,
) -> ProviderResult<Vec<CalendarEvent>> {
    let mut attempt = 0;
    loop {
        match provider
            .fetch_events(room, window.start(), window.end(), options.limit)
            .await
        {
            Err(e) if e.is_transient() && attempt < options.retries => {
                attempt += 1;
                debug!("Retrying room {} after {} (attempt {})", room, e, attempt);
                sleep(options.retry_backoff * attempt).await;
            }
            result => return result,
        }
    }
}
