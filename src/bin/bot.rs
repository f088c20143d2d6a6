use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::http::Http;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use rally::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandHandler,
};
use rally::core::Config;
use rally::database::Database;
use rally::features::events::{EventEngine, EventService, SerenityPlatform};
use rally::message_components::MessageComponentHandler;

struct Handler {
    command_handler: Arc<CommandHandler>,
    component_handler: Arc<MessageComponentHandler>,
    guild_id: Option<GuildId>,
    service: EventService,
    reminder_lead: Duration,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        let registered = match self.guild_id {
            Some(guild_id) => register_guild_commands(&ctx, guild_id).await,
            None => register_global_commands(&ctx).await,
        };
        if let Err(e) = registered {
            error!("Failed to register slash commands: {e}");
        }

        // Polls may have missed RSVPs while the bot was offline
        if let Err(e) = self.service.refresh_views(self.reminder_lead).await {
            warn!("Could not refresh active polls: {e}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self
                    .command_handler
                    .handle_slash_command(&ctx, &command)
                    .await
                {
                    error!(
                        "Error handling slash command '{}': {}",
                        command.data.name, e
                    );

                    let error_message = "❌ Sorry, I encountered an error processing your \
                                         command. Please try again.";

                    // Try to edit the deferred response, fallback to new response if that fails
                    if command
                        .edit_original_interaction_response(&ctx.http, |response| {
                            response.content(error_message)
                        })
                        .await
                        .is_err()
                    {
                        let _ = command
                            .create_interaction_response(&ctx.http, |response| {
                                response
                                    .kind(InteractionResponseType::ChannelMessageWithSource)
                                    .interaction_response_data(|message| {
                                        message.content(error_message).ephemeral(true)
                                    })
                            })
                            .await;
                    }
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {}",
                        component.data.custom_id, e
                    );

                    let _ = component
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    let text = "❌ Sorry, I couldn't record that. Please try again.";
                                    message.content(text).ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Rally event bot...");

    let database = Database::new(&config.database_path).await?;

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    // The engine gets its own HTTP client so it can start before the gateway
    let token = format!("Bot {}", config.discord_token.trim_start_matches("Bot "));
    let platform = Arc::new(SerenityPlatform::new(
        Arc::new(Http::new(&token)),
        config.presentation.clone(),
    ));
    let engine = EventEngine::start(
        Arc::new(database),
        platform,
        config.scheduler.clone(),
        config.presentation.clone(),
    );

    let context = CommandContext::new(engine.service(), config.presentation.clone());
    let command_handler = CommandHandler::new(context);
    let component_handler = MessageComponentHandler::new(command_handler.context());

    let handler = Handler {
        command_handler: Arc::new(command_handler),
        component_handler: Arc::new(component_handler),
        guild_id,
        service: engine.service(),
        reminder_lead: config.presentation.reminder_lead,
    };

    let intents = GatewayIntents::GUILDS;

    // Build the Discord client with proper gateway configuration
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        engine.shutdown();
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    engine.shutdown();
    Ok(())
}
