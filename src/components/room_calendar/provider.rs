use super::models::CalendarEvent;
use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result type for calendar provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A remote calendar that stores room bookings.
///
/// Implementations are expected to be network-fallible and eventually
/// consistent. There is no atomic "book if free" primitive.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events of `room` intersecting `[window_start, window_end)`, at most `limit` of them
    async fn fetch_events(
        &self,
        room: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: usize,
    ) -> ProviderResult<Vec<CalendarEvent>>;

    /// Book `room` for `requester` over `[start, end)`
    async fn create_event(
        &self,
        room: &str,
        requester: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<()>;
}
