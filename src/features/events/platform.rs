//! Chat platform seam
//!
//! The engine only talks to Discord through [`ChatPlatform`]. The serenity
//! implementation lives here too; tests use a recording fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::http::{Http, HttpError};
use serenity::model::id::{ChannelId, MessageId};
use serenity::Error as SerenityError;
use std::sync::Arc;

use super::error::PlatformError;
use super::model::Roster;
use crate::core::embeds::poll_embed;
use crate::core::EventPresentation;

/// Everything needed to re-render a poll message
#[derive(Debug, Clone)]
pub struct PollState<'a> {
    pub starts_at: DateTime<Utc>,
    pub roster: &'a Roster,
    pub capacity: usize,
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Confirm the message (and its channel) still exist
    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError>;

    /// Open a public thread on a message; returns the thread id
    async fn create_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
    ) -> Result<u64, PlatformError>;

    async fn send_message(&self, destination: u64, text: &str) -> Result<(), PlatformError>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError>;

    async fn delete_thread(&self, thread_id: u64) -> Result<(), PlatformError>;

    /// Replace the poll embed with a freshly rendered roster
    async fn edit_message_view(
        &self,
        channel_id: u64,
        message_id: u64,
        poll: &PollState<'_>,
    ) -> Result<(), PlatformError>;
}

/// [`ChatPlatform`] over serenity's HTTP client
pub struct SerenityPlatform {
    http: Arc<Http>,
    presentation: EventPresentation,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, presentation: EventPresentation) -> Self {
        Self { http, presentation }
    }
}

/// Split Discord 404s from every other failure
fn map_error(context: &str, err: SerenityError) -> PlatformError {
    if let SerenityError::Http(http_err) = &err {
        if let HttpError::UnsuccessfulRequest(response) = http_err.as_ref() {
            if response.status_code.as_u16() == 404 {
                return PlatformError::NotFound(format!("{context}: {}", response.error.message));
            }
        }
    }
    PlatformError::Request(format!("{context}: {err}"))
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        ChannelId(channel_id)
            .message(&self.http, MessageId(message_id))
            .await
            .map(|_| ())
            .map_err(|e| map_error("fetch message", e))
    }

    async fn create_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
    ) -> Result<u64, PlatformError> {
        ChannelId(channel_id)
            .create_public_thread(&self.http, MessageId(message_id), |thread| thread.name(name))
            .await
            .map(|thread| thread.id.0)
            .map_err(|e| map_error("create thread", e))
    }

    async fn send_message(&self, destination: u64, text: &str) -> Result<(), PlatformError> {
        ChannelId(destination)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| map_error("send message", e))
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        ChannelId(channel_id)
            .delete_message(&self.http, MessageId(message_id))
            .await
            .map_err(|e| map_error("delete message", e))
    }

    async fn delete_thread(&self, thread_id: u64) -> Result<(), PlatformError> {
        ChannelId(thread_id)
            .delete(&self.http)
            .await
            .map(|_| ())
            .map_err(|e| map_error("delete thread", e))
    }

    async fn edit_message_view(
        &self,
        channel_id: u64,
        message_id: u64,
        poll: &PollState<'_>,
    ) -> Result<(), PlatformError> {
        let embed = poll_embed(&self.presentation, poll.starts_at, poll.roster, poll.capacity);
        ChannelId(channel_id)
            .edit_message(&self.http, MessageId(message_id), |m| m.set_embed(embed))
            .await
            .map(|_| ())
            .map_err(|e| map_error("edit poll", e))
    }
}
