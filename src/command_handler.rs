use anyhow::Result;
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::registry::CommandRegistry;

/// Routes slash commands to their registered handler
#[derive(Clone)]
pub struct CommandHandler {
    context: Arc<CommandContext>,
    registry: CommandRegistry,
}

impl CommandHandler {
    pub fn new(context: CommandContext) -> Self {
        Self {
            context: Arc::new(context),
            registry: CommandRegistry::with_default_handlers(),
        }
    }

    pub fn context(&self) -> Arc<CommandContext> {
        Arc::clone(&self.context)
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let guild_id = command
            .guild_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "DM".to_string());

        info!(
            "📥 Slash command received | Command: {} | User: {} | Channel: {} | Guild: {}",
            command.data.name, command.user.id, command.channel_id, guild_id
        );

        let Some(handler) = self.registry.get(&command.data.name) else {
            warn!("No handler registered for /{}", command.data.name);
            command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message.content("Unknown command.").ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        handler.handle(self.context(), ctx, command).await?;
        debug!("✅ /{} handled", command.data.name);
        Ok(())
    }
}
