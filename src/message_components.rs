use anyhow::Result;
use log::{debug, info};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::CommandContext;
use crate::core::embeds::poll_embed;
use crate::features::events::{parse_rsvp_button, EventError, SignupStatus};

/// Handler for all message component interactions
pub struct MessageComponentHandler {
    context: Arc<CommandContext>,
}

impl MessageComponentHandler {
    pub fn new(context: Arc<CommandContext>) -> Self {
        Self { context }
    }

    /// Handle all types of component interactions
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        info!(
            "Processing component interaction: {custom_id} from user: {}",
            interaction.user.id
        );

        match parse_rsvp_button(custom_id) {
            Some(status) => self.handle_rsvp(ctx, interaction, status).await,
            None => {
                Self::reply_ephemeral(ctx, interaction, "Unknown component interaction.").await
            }
        }
    }

    /// Record the RSVP and redraw the poll in place
    async fn handle_rsvp(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        status: SignupStatus,
    ) -> Result<()> {
        let message_id = interaction.message.id.0;
        let user_id = interaction.user.id.0;
        let service = &self.context.service;

        let roster = match service.set_rsvp(message_id, user_id, status).await {
            Ok(roster) => roster,
            Err(EventError::CapacityExceeded { capacity, .. }) => {
                debug!("{user_id} turned away from full event {message_id}");
                let text = format!("❌ This event is full ({capacity} attending).");
                return Self::reply_ephemeral(ctx, interaction, &text).await;
            }
            Err(EventError::UnknownEvent(_)) => {
                return Self::reply_ephemeral(
                    ctx,
                    interaction,
                    "❌ This event is no longer scheduled.",
                )
                .await;
            }
            Err(e) => return Err(e.into()),
        };

        let Some(event) = service.get_event(message_id).await? else {
            return Self::reply_ephemeral(ctx, interaction, "❌ This event is no longer scheduled.")
                .await;
        };

        let embed = poll_embed(
            &self.context.presentation,
            event.starts_at(self.context.presentation.reminder_lead)?,
            &roster,
            self.context.capacity(),
        );

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::UpdateMessage)
                    .interaction_response_data(|message| message.set_embed(embed))
            })
            .await?;
        Ok(())
    }

    async fn reply_ephemeral(
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        text: &str,
    ) -> Result<()> {
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text).ephemeral(true))
            })
            .await?;
        Ok(())
    }
}
