use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Discord API error: {0}")]
    #[diagnostic(code(roomwatch::discord_api))]
    DiscordApi(#[from] serenity::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(code(roomwatch::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(roomwatch::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(roomwatch::provider))]
    Provider(#[from] ProviderError),

    #[error("Malformed calendar event: {0}")]
    #[diagnostic(code(roomwatch::malformed_event))]
    MalformedEvent(String),

    #[error("Invalid reservation: {0}")]
    #[diagnostic(code(roomwatch::invalid_reservation))]
    InvalidReservation(String),

    #[error("Invalid time window: {0}")]
    #[diagnostic(code(roomwatch::time_window))]
    TimeWindow(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(roomwatch::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(roomwatch::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(roomwatch::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(roomwatch::other))]
    Other(String),
}

/// Failures reported by a calendar provider
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ProviderError {
    /// Transient network or remote failure
    #[error("Calendar provider unavailable: {0}")]
    #[diagnostic(code(roomwatch::provider::unavailable))]
    Unavailable(String),

    /// Credentials were rejected
    #[error("Calendar provider rejected credentials: {0}")]
    #[diagnostic(code(roomwatch::provider::authentication))]
    Authentication(String),

    /// The provider does not know the room
    #[error("Unknown room: {0}")]
    #[diagnostic(code(roomwatch::provider::invalid_room))]
    InvalidRoom(String),
}

impl ProviderError {
    /// Whether retrying the same call can succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create malformed event errors
pub fn malformed_event_error(message: &str) -> Error {
    Error::MalformedEvent(message.to_string())
}

/// Helper to create reservation validation errors
pub fn reservation_error(message: &str) -> Error {
    Error::InvalidReservation(message.to_string())
}
