use poise::serenity_prelude as serenity;
use roomwatch::commands::{create_error_embed, get_all_application_commands, CommandContext};
use roomwatch::components::RoomCalendarHandle;
use roomwatch::config::Config;
use roomwatch::error::Error;
use rust_i18n::t;
use serenity::model::user::OnlineStatus;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::shutdown;

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serenity=warn,poise=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => {
            info!("Watching {} rooms: {}", config.rooms.len(), config.rooms.join(", "));
            Ok(Arc::new(RwLock::new(config)))
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize and start the Discord bot
pub async fn start_bot(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (token, activity) = {
        let config_read = config.read().await;
        rust_i18n::set_locale(&config_read.bot_locale);
        info!("Setting locale to {}", config_read.bot_locale);
        (
            config_read.discord_token()?.to_string(),
            config_read.activity.clone(),
        )
    };

    let options = poise::FrameworkOptions {
        commands: get_all_application_commands(),
        on_error: |error| Box::pin(on_error(error)),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some("!".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let intents = serenity::GatewayIntents::non_privileged();

    // Room calendars and the reservation actor
    let calendar = RoomCalendarHandle::from_config(Arc::clone(&config)).await?;
    let command_data = CommandContext::new(Arc::clone(&config), calendar.clone());

    let (shutdown_send, shutdown_recv) = oneshot::channel();

    let shutdown_calendar = calendar.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_calendar).await;
    });

    let client_result = serenity::ClientBuilder::new(token, intents)
        .framework(poise::Framework::new(options, move |ctx, ready, framework| {
            Box::pin(async move {
                info!("{} is connected!", ready.user.name);

                ctx.set_presence(
                    Some(serenity::ActivityData::watching(&activity)),
                    OnlineStatus::Online,
                );
                info!("Setting activity to {}", activity);

                if let Err(e) =
                    poise::builtins::register_globally(ctx, &framework.options().commands).await
                {
                    error!("Failed to register slash commands: {:?}", e);
                } else {
                    info!("Slash commands registered successfully");
                }

                Ok(command_data)
            })
        }))
        .await;

    info!("Starting bot...");
    let mut client = client_result.map_err(Error::from)?;

    let client_handle = tokio::spawn(async move {
        if let Err(e) = client.start().await {
            Err(Error::from(e))
        } else {
            Ok(())
        }
    });

    // Wait for either the client to end or a shutdown signal
    tokio::select! {
        result = client_handle => {
            info!("Bot process ended");
            match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => {
                    error!("Client task error: {:?}", e);
                    Err(Error::Other(format!("Client task error: {}", e)).into())
                }
            }
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, shutting down bot...");
            Ok(())
        }
    }
}

/// Handle errors from commands
async fn on_error(error: poise::FrameworkError<'_, CommandContext, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Error during setup: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .embed(create_error_embed(
                            &t!("error_title", context = "command"),
                            &format!("{}", error),
                        ))
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        poise::FrameworkError::ArgumentParse { error, input, ctx, .. } => {
            error!("Bad arguments for '{}': {:?} ({:?})", ctx.command().name, error, input);
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .embed(create_error_embed(
                            &t!("error_title", context = "arguments"),
                            &format!("{}", error),
                        ))
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        error => {
            error!("Other error: {:?}", error);
        }
    }
}
