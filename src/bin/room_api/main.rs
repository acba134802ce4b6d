mod auth;
mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use roomwatch::components::RoomCalendarHandle;
use roomwatch::config::Config;
use roomwatch::error::{env_error, Error};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::require_api_key;
use crate::handlers::{
    health_handler, reserve_handler, room_events_handler, room_status_handler, room_today_handler,
    rooms_handler, status_handler,
};

#[derive(Clone)]
pub struct AppState {
    /// Shared configuration
    pub config: Arc<RwLock<Config>>,
    /// Room calendars and the reservation actor
    pub calendar: RoomCalendarHandle,
    /// Key expected in the `APIKey` header
    pub api_key: Arc<str>,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/calendars", get(rooms_handler))
        .route("/calendars/status", get(status_handler))
        .route("/calendars/reserve", post(reserve_handler))
        .route("/calendars/{room}", get(room_today_handler))
        .route("/calendars/{room}/status", get(room_status_handler))
        .route("/calendars/{room}/{start}/{end}", get(room_events_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting room API server");

    let config = Config::load()?;
    let api_key: Arc<str> = config
        .api_key
        .as_deref()
        .ok_or_else(|| env_error("API_KEY"))?
        .into();
    let port = config.port;
    let config = Arc::new(RwLock::new(config));

    let calendar = RoomCalendarHandle::from_config(Arc::clone(&config)).await?;
    let state = AppState {
        config,
        calendar: calendar.clone(),
        api_key,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down reservation actor: {:?}", e);
    }
    info!("Room API server stopped");

    Ok(())
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
