use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::AppState;

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "apikey";

/// Reject requests whose `APIKey` header is missing or wrong
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let authorized = provided.is_some_and(|key| key == &*state.api_key);

    if authorized {
        return next.run(req).await;
    }

    if provided.is_some() {
        warn!("Rejected request to {} with wrong API key", req.uri().path());
    } else {
        warn!("Rejected request to {} without API key", req.uri().path());
    }
    StatusCode::FORBIDDEN.into_response()
}
