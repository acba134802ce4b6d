use super::actor::{ReservationActor, ReservationActorHandle};
use super::memory::InMemoryCalendar;
use super::provider::CalendarProvider;
use crate::availability::{
    resolve, snapshot, EventSet, ReservationOutcome, ReservationRequest, RoomStatus, Snapshot,
    SnapshotOptions, TimeWindow,
};
use crate::config::Config;
use crate::error::{BotResult, ProviderError};
use crate::utils::time::{rest_of_day, whole_day};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Entry point to room availability used by the chat commands and the REST API
#[derive(Clone)]
pub struct RoomCalendarHandle {
    config: Arc<RwLock<Config>>,
    provider: Arc<dyn CalendarProvider>,
    reservations: ReservationActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl fmt::Debug for RoomCalendarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomCalendarHandle")
            .field("reservations", &self.reservations)
            .finish_non_exhaustive()
    }
}

impl RoomCalendarHandle {
    /// Create a new handle and spawn the reservation actor
    pub async fn new(config: Arc<RwLock<Config>>, provider: Arc<dyn CalendarProvider>) -> Self {
        let event_limit = config.read().await.event_limit;
        let (mut actor, reservations) = ReservationActor::new(Arc::clone(&provider), event_limit);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            config,
            provider,
            reservations,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Create a handle backed by the calendar file named in the config
    pub async fn from_config(config: Arc<RwLock<Config>>) -> BotResult<Self> {
        let provider = {
            let config = config.read().await;
            InMemoryCalendar::load(&config.rooms, &config.calendar_file)?
                .with_reservation_subject(&config.reservation_subject)
        };
        Ok(Self::new(config, Arc::new(provider)).await)
    }

    /// Configured rooms
    pub async fn rooms(&self) -> Vec<String> {
        self.config.read().await.rooms.clone()
    }

    /// Whether `room` is one of the configured rooms
    pub async fn has_room(&self, room: &str) -> bool {
        self.config.read().await.has_room(room)
    }

    /// Status of every configured room from `now` until local midnight
    pub async fn snapshot_today(&self, now: DateTime<Utc>) -> BotResult<Snapshot> {
        let (rooms, window, options) = {
            let config = self.config.read().await;
            let options = SnapshotOptions {
                limit: config.event_limit,
                timeout: Some(config.snapshot_timeout()),
                retries: config.fetch_retries,
                retry_backoff: config.retry_backoff(),
            };
            (config.rooms.clone(), rest_of_day(now, config.tz()?)?, options)
        };

        Ok(snapshot(self.provider.as_ref(), &rooms, window, now, &options).await)
    }

    /// Events of a configured room within `window`
    pub async fn room_events(&self, room: &str, window: TimeWindow) -> BotResult<EventSet> {
        let (room, limit) = {
            let config = self.config.read().await;
            if !config.has_room(room) {
                return Err(ProviderError::InvalidRoom(room.to_string()).into());
            }
            (room.trim().to_lowercase(), config.event_limit)
        };

        debug!("Fetching events for room {}", room);
        let events = self
            .provider
            .fetch_events(&room, window.start(), window.end(), limit)
            .await?;
        Ok(EventSet::new(room, window, events))
    }

    /// Events of a configured room over the whole local day containing `now`
    pub async fn room_events_today(&self, room: &str, now: DateTime<Utc>) -> BotResult<EventSet> {
        let tz = self.config.read().await.tz()?;
        self.room_events(room, whole_day(now, tz)?).await
    }

    /// Status of a single configured room at `now`
    pub async fn room_status(&self, room: &str, now: DateTime<Utc>) -> BotResult<RoomStatus> {
        let tz = self.config.read().await.tz()?;
        let events = self.room_events(room, rest_of_day(now, tz)?).await?;
        Ok(resolve(&events, now))
    }

    /// Reserve a configured room if the requested time is free
    pub async fn reserve(&self, request: ReservationRequest) -> BotResult<ReservationOutcome> {
        if !self.has_room(request.room_name()).await {
            return Ok(ReservationOutcome::Failed(ProviderError::InvalidRoom(
                request.room_name().to_string(),
            )));
        }
        self.reservations.reserve(request).await
    }

    /// Shutdown the reservation actor
    pub async fn shutdown(&self) -> BotResult<()> {
        self.reservations.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::room_calendar::CalendarEvent;
    use crate::config::parse_rooms;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    async fn handle() -> RoomCalendarHandle {
        let config = Config {
            rooms: parse_rooms("everest"),
            ..Default::default()
        };
        let calendar = InMemoryCalendar::new(&config.rooms);
        for (organizer, start, end) in [("Aino", 7, 8), ("Bertil", 15, 16)] {
            let event = CalendarEvent {
                organizer_name: organizer.to_string(),
                organizer_email: String::new(),
                subject: String::new(),
                start: at(start),
                end: at(end),
                recurring: false,
                show_as: None,
            };
            calendar.insert("everest", event).await.unwrap();
        }
        RoomCalendarHandle::new(Arc::new(RwLock::new(config)), Arc::new(calendar)).await
    }

    #[tokio::test]
    async fn test_room_events_today_covers_whole_day() {
        let calendar = handle().await;

        // Afternoon reference still sees the morning booking
        let events = calendar.room_events_today("everest", at(12)).await.unwrap();
        let organizers: Vec<&str> = events
            .events()
            .iter()
            .map(|e| e.organizer_name.as_str())
            .collect();
        assert_eq!(organizers, vec!["Aino", "Bertil"]);
        assert_eq!(events.window().start(), at(0));
    }

    #[tokio::test]
    async fn test_handle_is_debug() {
        let calendar = handle().await;
        assert!(format!("{:?}", calendar).starts_with("RoomCalendarHandle"));
    }
}
