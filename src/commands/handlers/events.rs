//! Event command handlers
//!
//! Handles: event, event_status, event_cancel_all
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::{ChannelId, MessageId};
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_integer_option, get_string_option};
use crate::core::embeds::{poll_embed, status_embed};
use crate::features::events::{create_poll_buttons, next_occurrence, parse_weekday, Roster};

/// Handler for event scheduling commands
pub struct EventCommandHandler;

#[async_trait]
impl SlashCommandHandler for EventCommandHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["event", "event_status", "event_cancel_all"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "event" => self.handle_event(&ctx, serenity_ctx, command).await,
            "event_status" => self.handle_status(&ctx, serenity_ctx, command).await,
            "event_cancel_all" => self.handle_cancel_all(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl EventCommandHandler {
    /// Handle /event command - post a poll and schedule its reminder
    async fn handle_event(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let day = get_string_option(&command.data.options, "day")
            .ok_or_else(|| anyhow::anyhow!("Missing day parameter"))?;
        let hour = get_integer_option(&command.data.options, "hour")
            .ok_or_else(|| anyhow::anyhow!("Missing hour parameter"))?;

        let starts_at = parse_weekday(&day)
            .zip(u32::try_from(hour).ok())
            .and_then(|(weekday, hour)| next_occurrence(Utc::now(), weekday, hour));
        let Some(starts_at) = starts_at else {
            let text = "❌ Pick a weekday and an hour between 0 and 23.";
            Self::reply_ephemeral(serenity_ctx, command, text).await?;
            return Ok(());
        };

        let lead = chrono::Duration::from_std(ctx.presentation.reminder_lead)?;
        let due_at = starts_at
            .checked_sub_signed(lead)
            .with_context(|| format!("Reminder lead pushes {starts_at} out of range"))?;
        let embed = poll_embed(&ctx.presentation, starts_at, &Roster::default(), ctx.capacity());

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .add_embed(embed)
                            .set_components(create_poll_buttons())
                    })
            })
            .await?;

        let poll = command.get_interaction_response(&serenity_ctx.http).await?;
        if let Err(e) = ctx
            .service
            .create_event(poll.id.0, command.channel_id.0, due_at)
            .await
        {
            // A poll nobody tracks would collect RSVPs for nothing
            warn!("Failed to schedule event for poll {}: {e}", poll.id);
            let _ = command
                .delete_original_interaction_response(&serenity_ctx.http)
                .await;
            return Err(e.into());
        }

        info!(
            "Event poll {} posted by {} for {starts_at}",
            poll.id, command.user.id
        );
        Ok(())
    }

    /// Handle /event_status command - ephemeral list of pending events
    async fn handle_status(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let events = ctx.service.list_active().await?;
        debug!("Status requested: {} active event(s)", events.len());

        if events.is_empty() {
            let text = "📭 No events are scheduled.";
            return Self::reply_ephemeral(serenity_ctx, command, text).await;
        }

        let embed = status_embed(&events, ctx.presentation.reminder_lead);
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.add_embed(embed).ephemeral(true))
            })
            .await?;
        Ok(())
    }

    /// Handle /event_cancel_all command (admin)
    async fn handle_cancel_all(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let is_admin = command
            .member
            .as_ref()
            .and_then(|member| member.permissions)
            .map_or(false, |permissions| permissions.administrator());
        if !is_admin {
            return Self::reply_ephemeral(
                serenity_ctx,
                command,
                "❌ Only administrators can cancel events.",
            )
            .await;
        }

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                    .interaction_response_data(|message| message.ephemeral(true))
            })
            .await?;

        let removed = ctx.service.cancel_all().await?;
        for event in &removed {
            if let Err(e) = ChannelId(event.channel_id)
                .delete_message(&serenity_ctx.http, MessageId(event.message_id))
                .await
            {
                debug!("Poll {} not deleted: {e}", event.message_id);
            }
        }

        info!("{} cancelled {} event(s)", command.user.id, removed.len());
        command
            .edit_original_interaction_response(&serenity_ctx.http, |response| {
                response.content(format!("🗑️ Cancelled {} event(s).", removed.len()))
            })
            .await?;
        Ok(())
    }

    async fn reply_ephemeral(
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        text: &str,
    ) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text).ephemeral(true))
            })
            .await?;
        Ok(())
    }
}
