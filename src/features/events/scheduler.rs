//! # Reminder Scheduler
//!
//! Fires due events: opens a discussion thread on the poll, pings everyone
//! who accepted, then deactivates the event and arms its cleanup.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Dynamic wake via the shared due loop instead of a fixed poll
//! - 1.0.0: Initial reminder delivery

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::Arc;

use super::due_loop::{DueWorker, WakeSignal};
use super::error::{EventError, PlatformError};
use super::model::{offset, Event, Roster};
use super::platform::ChatPlatform;
use super::store::ReminderStore;
use crate::core::response::{chunk_words, mention, MESSAGE_LIMIT};
use crate::core::{EventPresentation, SchedulerSettings};

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    platform: Arc<dyn ChatPlatform>,
    settings: SchedulerSettings,
    presentation: EventPresentation,
    cleanup_wake: WakeSignal,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        platform: Arc<dyn ChatPlatform>,
        settings: SchedulerSettings,
        presentation: EventPresentation,
        cleanup_wake: WakeSignal,
    ) -> Self {
        Self {
            store,
            platform,
            settings,
            presentation,
            cleanup_wake,
        }
    }

    /// Fire one event. Platform failures are logged and never stop the
    /// event from being deactivated.
    async fn fire(&self, event: &Event, now: DateTime<Utc>) -> Result<(), EventError> {
        // Both times are settled before anything reaches the platform
        let starts_at = event.starts_at(self.presentation.reminder_lead)?;
        let cleanup_due_at = offset(now, self.settings.retention)?;

        let signups = self.store.list_signups(event.message_id).await?;
        let accepted = Roster::from_signups(&signups).accepted;

        let thread_id = match self.open_thread(event).await {
            Ok(thread_id) => {
                self.post_reminder(thread_id, event, starts_at, &accepted).await;
                Some(thread_id)
            }
            Err(e) if e.is_not_found() => {
                warn!("Poll {} is gone, skipping reminder: {e}", event.message_id);
                None
            }
            Err(e) => {
                error!("Failed to open thread for event {}: {e}", event.message_id);
                None
            }
        };

        if self
            .store
            .deactivate(event.message_id, thread_id, cleanup_due_at)
            .await?
        {
            info!(
                "🔔 Fired event {} ({} accepted), cleanup at {cleanup_due_at}",
                event.message_id,
                accepted.len()
            );
        } else if let Some(thread_id) = thread_id {
            // Cancelled while firing; nothing will clean this thread up later
            warn!("Event {} vanished mid-fire, removing its thread", event.message_id);
            if let Err(e) = self.platform.delete_thread(thread_id).await {
                warn!("Failed to delete orphaned thread {thread_id}: {e}");
            }
        }

        Ok(())
    }

    async fn open_thread(&self, event: &Event) -> Result<u64, PlatformError> {
        self.platform
            .fetch_message(event.channel_id, event.message_id)
            .await?;
        self.platform
            .create_thread(event.channel_id, event.message_id, &self.settings.thread_name)
            .await
    }

    async fn post_reminder(
        &self,
        thread_id: u64,
        event: &Event,
        starts_at: DateTime<Utc>,
        accepted: &[u64],
    ) {
        let text = reminder_text(&self.presentation.title, starts_at, accepted);

        for chunk in chunk_words(&text, MESSAGE_LIMIT) {
            if let Err(e) = self.platform.send_message(thread_id, &chunk).await {
                error!("Failed to send reminder for event {}: {e}", event.message_id);
                return;
            }
        }
    }
}

/// Reminder body: a headline, then one mention per accepted user
pub fn reminder_text(title: &str, starts_at: DateTime<Utc>, accepted: &[u64]) -> String {
    let headline = format!("**Reminder!** {title} starts <t:{}:R>!", starts_at.timestamp());
    if accepted.is_empty() {
        return headline;
    }

    let mentions: Vec<String> = accepted.iter().map(|id| mention(*id)).collect();
    format!("{headline}\n{}", mentions.join(" "))
}

#[async_trait]
impl DueWorker for ReminderScheduler {
    fn name(&self) -> &'static str {
        "Reminder scheduler"
    }

    async fn next_due(&self) -> Result<Option<DateTime<Utc>>, EventError> {
        Ok(self.store.next_due().await?.map(|event| event.due_at))
    }

    async fn process_due(&self, now: DateTime<Utc>) -> Result<usize, EventError> {
        let due = self.store.list_due(now).await?;
        for event in &due {
            self.fire(event, now).await?;
        }

        if !due.is_empty() {
            self.cleanup_wake.wake();
        }
        Ok(due.len())
    }
}
