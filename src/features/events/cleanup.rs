//! Deferred removal of fired events
//!
//! Driven by the same due loop as the reminder scheduler, keyed on the
//! persisted `cleanup_due_at`. Anything overdue at startup is swept on the
//! first cycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use super::due_loop::DueWorker;
use super::error::{EventError, PlatformError};
use super::model::Event;
use super::platform::ChatPlatform;
use super::store::ReminderStore;

pub struct CleanupScheduler {
    store: Arc<dyn ReminderStore>,
    platform: Arc<dyn ChatPlatform>,
}

impl CleanupScheduler {
    pub fn new(store: Arc<dyn ReminderStore>, platform: Arc<dyn ChatPlatform>) -> Self {
        Self { store, platform }
    }

    async fn clean(&self, event: &Event) -> Result<(), EventError> {
        if !self.store.purge_event(event.message_id).await? {
            debug!("Event {} already removed", event.message_id);
        }

        log_best_effort(
            "poll message",
            event.message_id,
            self.platform
                .delete_message(event.channel_id, event.message_id)
                .await,
        );
        if let Some(thread_id) = event.thread_id {
            log_best_effort("thread", thread_id, self.platform.delete_thread(thread_id).await);
        }

        info!("🧹 Cleaned up event {}", event.message_id);
        Ok(())
    }
}

fn log_best_effort(what: &str, id: u64, result: Result<(), PlatformError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_not_found() => debug!("{what} {id} already gone"),
        Err(e) => warn!("Failed to delete {what} {id}: {e}"),
    }
}

#[async_trait]
impl DueWorker for CleanupScheduler {
    fn name(&self) -> &'static str {
        "Cleanup scheduler"
    }

    async fn next_due(&self) -> Result<Option<DateTime<Utc>>, EventError> {
        self.store.next_cleanup_due().await
    }

    async fn process_due(&self, now: DateTime<Utc>) -> Result<usize, EventError> {
        let due = self.store.list_cleanup_due(now).await?;
        for event in &due {
            self.clean(event).await?;
        }
        Ok(due.len())
    }
}
