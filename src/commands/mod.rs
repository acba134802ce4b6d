use crate::components::RoomCalendarHandle;
use crate::config::Config;
use crate::error::BotResult;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;

// Export submodules
pub mod rooms;
pub mod util;

/// Shared context for all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub calendar: RoomCalendarHandle,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<RwLock<Config>>, calendar: RoomCalendarHandle) -> Self {
        Self { config, calendar }
    }
}

/// Type alias for command result
pub type CommandResult = BotResult<()>;

/// Type alias for poise context
pub type Context<'a> = poise::Context<'a, CommandContext, crate::error::Error>;

/// All application commands
pub fn get_all_application_commands() -> Vec<poise::Command<CommandContext, crate::error::Error>> {
    vec![
        // Utility commands
        util::ping(),
        // Room commands
        rooms::rooms(),
        rooms::schedule(),
        rooms::reserve(),
    ]
}

/// Embed for failed operations
pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0xE7_4C_3C)
}

/// Embed for successful operations
pub fn create_success_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x2E_CC_71)
}

/// Embed for rejected but valid requests
pub fn create_warning_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0xF1_C4_0F)
}

/// Embed for plain information
pub fn create_info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x00_99_FF)
}
