use crate::error::{config_error, env_error, BotResult, Error};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default activity text for the bot
pub const DEFAULT_ACTIVITY: &str = "Watching the meeting rooms";

/// Default location of the calendar fixture file
pub const DEFAULT_CALENDAR_FILE: &str = "config/calendar.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot token, only needed by the chat bot
    pub discord_token: Option<String>,
    /// Static API key checked by the REST API
    pub api_key: Option<String>,
    /// Room identifiers, lower-cased and deduplicated
    pub rooms: Vec<String>,
    /// Timezone used for "today" windows and displayed times
    pub timezone: String,
    /// Path of the calendar fixture loaded by the in-memory provider
    pub calendar_file: String,
    /// Maximum number of events requested per room and window
    pub event_limit: usize,
    /// Timeout for a whole multi-room snapshot, in seconds
    pub snapshot_timeout_secs: u64,
    /// Retries for transient per-room fetch failures
    pub fetch_retries: u32,
    /// Backoff step between retries, in milliseconds
    pub retry_backoff_ms: u64,
    /// Subject used for reservations created through this service
    pub reservation_subject: String,
    /// Bot activity status text
    pub activity: String,
    /// Locale for chat messages
    pub bot_locale: String,
    /// Port of the REST API
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: None,
            api_key: None,
            rooms: Vec::new(),
            timezone: "UTC".to_string(),
            calendar_file: DEFAULT_CALENDAR_FILE.to_string(),
            event_limit: 30,
            snapshot_timeout_secs: 10,
            fetch_retries: 1,
            retry_backoff_ms: 250,
            reservation_subject: "Room reservation".to_string(),
            activity: DEFAULT_ACTIVITY.to_string(),
            bot_locale: "en".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load configuration from the environment and an optional `.env` file
    pub fn load() -> BotResult<Self> {
        dotenv().ok();

        let rooms = parse_rooms(&env::var("ROOMS").map_err(|_| env_error("ROOMS"))?);
        if rooms.is_empty() {
            return Err(config_error("ROOMS must name at least one room"));
        }

        let defaults = Config::default();

        let config = Config {
            discord_token: env::var("DISCORD_TOKEN").ok().filter(|t| !t.is_empty()),
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            rooms,
            timezone: env::var("TIMEZONE").unwrap_or(defaults.timezone),
            calendar_file: env::var("CALENDAR_FILE").unwrap_or(defaults.calendar_file),
            event_limit: parse_var("EVENT_LIMIT", defaults.event_limit)?,
            snapshot_timeout_secs: parse_var("SNAPSHOT_TIMEOUT_SECS", defaults.snapshot_timeout_secs)?,
            fetch_retries: parse_var("FETCH_RETRIES", defaults.fetch_retries)?,
            retry_backoff_ms: parse_var("RETRY_BACKOFF_MS", defaults.retry_backoff_ms)?,
            reservation_subject: env::var("RESERVATION_SUBJECT")
                .unwrap_or(defaults.reservation_subject),
            activity: env::var("BOT_ACTIVITY").unwrap_or(defaults.activity),
            bot_locale: env::var("BOT_LOCALE").unwrap_or(defaults.bot_locale),
            port: parse_var("PORT", defaults.port)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that cannot be expressed by the types alone
    pub fn validate(&self) -> BotResult<()> {
        self.tz()?;
        if self.event_limit == 0 {
            return Err(config_error("EVENT_LIMIT must be greater than zero"));
        }
        Ok(())
    }

    /// Parsed configured timezone
    pub fn tz(&self) -> BotResult<Tz> {
        Tz::from_str(&self.timezone)
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Discord token, required by the chat bot
    pub fn discord_token(&self) -> BotResult<&str> {
        self.discord_token
            .as_deref()
            .ok_or_else(|| env_error("DISCORD_TOKEN"))
    }

    /// Whether a room is one of the configured rooms
    pub fn has_room(&self, room: &str) -> bool {
        let room = room.trim().to_lowercase();
        self.rooms.iter().any(|r| *r == room)
    }

    /// Timeout applied to a whole snapshot
    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_timeout_secs)
    }

    /// Backoff step between fetch retries
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Split a comma separated room list into normalized identifiers
pub fn parse_rooms(raw: &str) -> Vec<String> {
    let mut rooms: Vec<String> = raw
        .split(',')
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect();
    rooms.sort();
    rooms.dedup();
    rooms
}

fn parse_var<T: FromStr>(name: &str, default: T) -> BotResult<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| Error::Environment(format!("Invalid {} format", name))),
        Err(_) => Ok(default),
    }
}
