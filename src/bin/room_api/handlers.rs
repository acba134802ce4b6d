use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use roomwatch::availability::{
    free_slots, EventSet, ReservationOutcome, ReservationRequest, RoomStatus, Snapshot, TimeWindow,
};
use roomwatch::components::room_calendar::CalendarEvent;
use roomwatch::error::{Error, ProviderError};
use roomwatch::utils::time::parse_compact_local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Error returned by the API handlers
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Provider(ProviderError::InvalidRoom(room)) => {
                ApiError::NotFound(format!("Unknown room: {}", room))
            }
            Error::Provider(e) => ApiError::BadGateway(e.to_string()),
            Error::InvalidReservation(_) | Error::TimeWindow(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadGateway(m) => (StatusCode::BAD_GATEWAY, m),
            ApiError::Internal(m) => {
                error!("Internal error: {}", m);
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Events of one room within a window
#[derive(Debug, Serialize)]
pub struct RoomEvents {
    pub room: String,
    pub window: TimeWindow,
    pub events: Vec<CalendarEvent>,
    pub free_slots: Vec<TimeWindow>,
}

impl From<EventSet> for RoomEvents {
    fn from(events: EventSet) -> Self {
        let window = events.window();
        Self {
            room: events.room().to_string(),
            window,
            free_slots: free_slots(&events, window),
            events: events.events().to_vec(),
        }
    }
}

/// Body of a reservation request, times in `yyyyMMddTHHmm` local time
#[derive(Debug, Deserialize)]
pub struct ReserveBody {
    pub room: String,
    pub requester: String,
    pub start: String,
    pub end: String,
}

/// Result of a reservation request
#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<CalendarEvent>,
}

/// Health check handler
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Configured rooms
pub async fn rooms_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.calendar.rooms().await)
}

/// Status of every room
pub async fn status_handler(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = state.calendar.snapshot_today(Utc::now()).await?;
    Ok(Json(snapshot))
}

/// Bookings of one room for the whole local day
pub async fn room_today_handler(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<RoomEvents>, ApiError> {
    let events = state.calendar.room_events_today(&room, Utc::now()).await?;
    Ok(Json(RoomEvents::from(events)))
}

/// Status of one room
pub async fn room_status_handler(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<RoomStatus>, ApiError> {
    let status = state.calendar.room_status(&room, Utc::now()).await?;
    Ok(Json(status))
}

/// Events of one room between two local times
pub async fn room_events_handler(
    State(state): State<AppState>,
    Path((room, start, end)): Path<(String, String, String)>,
) -> Result<Json<RoomEvents>, ApiError> {
    let tz = state.config.read().await.tz()?;
    let start = parse_compact_local(&start, tz).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let end = parse_compact_local(&end, tz).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let window = TimeWindow::new(start, end)?;

    let events = state.calendar.room_events(&room, window).await?;
    Ok(Json(RoomEvents::from(events)))
}

/// Reserve a room if the requested time is free
pub async fn reserve_handler(
    State(state): State<AppState>,
    body: Result<Json<ReserveBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ReserveResponse>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let tz = state.config.read().await.tz()?;
    let start =
        parse_compact_local(&body.start, tz).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let end = parse_compact_local(&body.end, tz).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let request = ReservationRequest::new(&body.room, &body.requester, start, end)?;

    match state.calendar.reserve(request).await? {
        ReservationOutcome::Accepted => {
            info!("Reserved {} for {}", body.room, body.requester);
            Ok((
                StatusCode::CREATED,
                Json(ReserveResponse {
                    status: "accepted",
                    conflicts: Vec::new(),
                }),
            ))
        }
        ReservationOutcome::Conflict(conflicts) => Ok((
            StatusCode::CONFLICT,
            Json(ReserveResponse {
                status: "conflict",
                conflicts,
            }),
        )),
        ReservationOutcome::Failed(e) => Err(Error::Provider(e).into()),
    }
}
