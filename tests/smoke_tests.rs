use chrono::{TimeZone, Utc};
use roomwatch::availability::TimeWindow;
use roomwatch::components::room_calendar::{CalendarProvider, InMemoryCalendar};
use roomwatch::components::RoomCalendarHandle;
use roomwatch::config::{parse_rooms, Config, DEFAULT_CALENDAR_FILE};
use roomwatch::error::{Error, ProviderError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Smoke test to verify the defaults line up with the documented settings
#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.timezone, "UTC");
    assert_eq!(config.calendar_file, DEFAULT_CALENDAR_FILE);
    assert_eq!(config.event_limit, 30);
    assert_eq!(config.snapshot_timeout().as_secs(), 10);
    assert_eq!(config.fetch_retries, 1);
    assert_eq!(config.retry_backoff().as_millis(), 250);
    assert_eq!(config.port, 3000);
    assert!(config.validate().is_ok());
}

/// The bundled calendar file loads and skips rooms that are not configured
#[tokio::test]
async fn test_bundled_calendar_loads() {
    let rooms = parse_rooms("everest,k2");
    let calendar = InMemoryCalendar::load(&rooms, DEFAULT_CALENDAR_FILE).unwrap();

    let start = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 10, 21, 0, 0, 0).unwrap();

    let everest = calendar.fetch_events("everest", start, end, 30).await.unwrap();
    assert_eq!(everest.len(), 2);
    assert!(everest[0].start < everest[1].start);

    let missing = calendar.fetch_events("annapurna", start, end, 30).await;
    assert_eq!(
        missing,
        Err(ProviderError::InvalidRoom("annapurna".to_string()))
    );
}

#[tokio::test]
async fn test_missing_calendar_file_starts_empty() {
    let rooms = parse_rooms("everest");
    let calendar = InMemoryCalendar::load(&rooms, "config/does-not-exist.toml").unwrap();

    let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();
    assert!(calendar
        .fetch_events("everest", start, end, 30)
        .await
        .unwrap()
        .is_empty());
}

/// Smoke test for the calendar handle built from configuration
#[tokio::test]
async fn test_handle_from_config() {
    let config = Config {
        rooms: parse_rooms("k2,everest"),
        timezone: "Europe/Helsinki".to_string(),
        ..Default::default()
    };
    let calendar = RoomCalendarHandle::from_config(Arc::new(RwLock::new(config)))
        .await
        .unwrap();

    assert_eq!(calendar.rooms().await, vec!["everest", "k2"]);
    assert!(calendar.has_room("K2").await);

    let now = Utc::now();
    let snapshot = calendar.snapshot_today(now).await.unwrap();
    assert_eq!(snapshot.statuses.len(), 2);
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.window.start(), now);

    let window = TimeWindow::new(
        Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap(),
    )
    .unwrap();
    let events = calendar.room_events("Everest", window).await.unwrap();
    assert_eq!(events.room(), "everest");
    assert_eq!(events.len(), 2);

    let unknown = calendar.room_events("attic", window).await;
    assert!(matches!(
        unknown,
        Err(Error::Provider(ProviderError::InvalidRoom(_)))
    ));

    calendar.shutdown().await.unwrap();
}
