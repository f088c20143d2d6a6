//! Entry point for the command and button layers

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use super::due_loop::WakeSignal;
use super::error::EventError;
use super::model::{Event, Roster, SignupStatus};
use super::platform::{ChatPlatform, PollState};
use super::rsvp;
use super::store::ReminderStore;

/// Cheap to clone; every clone shares the store and the scheduler's wake signal
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn ReminderStore>,
    platform: Arc<dyn ChatPlatform>,
    reminder_wake: WakeSignal,
    capacity: usize,
}

impl EventService {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        platform: Arc<dyn ChatPlatform>,
        reminder_wake: WakeSignal,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            platform,
            reminder_wake,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Schedule a reminder for the poll `message_id` and wake the scheduler
    /// so an earlier due time is picked up immediately.
    pub async fn create_event(
        &self,
        message_id: u64,
        channel_id: u64,
        due_at: DateTime<Utc>,
    ) -> Result<u64, EventError> {
        self.store
            .insert_event(&Event::new(message_id, channel_id, due_at))
            .await?;
        self.reminder_wake.wake();

        info!("📅 Scheduled event {message_id} in channel {channel_id}, reminder at {due_at}");
        Ok(message_id)
    }

    pub async fn set_rsvp(
        &self,
        message_id: u64,
        user_id: u64,
        status: SignupStatus,
    ) -> Result<Roster, EventError> {
        rsvp::set_rsvp(self.store.as_ref(), message_id, user_id, status, self.capacity).await
    }

    pub async fn get_event(&self, message_id: u64) -> Result<Option<Event>, EventError> {
        self.store.get_event(message_id).await
    }

    pub async fn list_active(&self) -> Result<Vec<Event>, EventError> {
        self.store.list_active().await
    }

    /// Remove every pending event; returns what was removed so the caller
    /// can take down the polls.
    pub async fn cancel_all(&self) -> Result<Vec<Event>, EventError> {
        let removed = self.store.delete_all_active().await?;
        self.reminder_wake.wake();

        info!("🗑️ Cancelled {} active event(s)", removed.len());
        Ok(removed)
    }

    /// Re-render every active poll from stored signups. Failures are logged
    /// and skipped.
    pub async fn refresh_views(
        &self,
        reminder_lead: std::time::Duration,
    ) -> Result<usize, EventError> {
        let mut refreshed = 0;

        for event in self.store.list_active().await? {
            let starts_at = match event.starts_at(reminder_lead) {
                Ok(starts_at) => starts_at,
                Err(e) => {
                    warn!("Skipping poll {}: {e}", event.message_id);
                    continue;
                }
            };
            let roster = Roster::from_signups(&self.store.list_signups(event.message_id).await?);
            let poll = PollState {
                starts_at,
                roster: &roster,
                capacity: self.capacity,
            };

            match self
                .platform
                .edit_message_view(event.channel_id, event.message_id, &poll)
                .await
            {
                Ok(()) => refreshed += 1,
                Err(e) => warn!("Could not refresh poll {}: {e}", event.message_id),
            }
        }

        info!("🔄 Refreshed {refreshed} active poll(s)");
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::features::events::testing::{PlatformCall, RecordingPlatform};
    use std::time::Duration;

    async fn service(capacity: usize) -> (EventService, Arc<RecordingPlatform>, WakeSignal) {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        let platform = Arc::new(RecordingPlatform::new());
        let wake = WakeSignal::new();
        let service = EventService::new(db, platform.clone(), wake.clone(), capacity);
        (service, platform, wake)
    }

    #[tokio::test]
    async fn test_create_event_wakes_scheduler() {
        let (service, _, wake) = service(5).await;
        let due = Utc::now() + chrono::Duration::hours(1);

        assert_eq!(service.create_event(42, 1, due).await.unwrap(), 42);
        assert!(wake.wait(Duration::from_millis(10)).await);

        let active = service.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message_id, 42);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let (service, _, _) = service(5).await;
        let due = Utc::now();
        service.create_event(42, 1, due).await.unwrap();

        let err = service.create_event(42, 1, due).await.unwrap_err();
        assert!(matches!(err, EventError::DuplicateKey(42)));
    }

    #[tokio::test]
    async fn test_cancel_all_empties_active_set() {
        let (service, _, _) = service(5).await;
        let due = Utc::now() + chrono::Duration::hours(1);
        service.create_event(1, 9, due).await.unwrap();
        service.create_event(2, 9, due).await.unwrap();
        service.set_rsvp(1, 7, SignupStatus::Accepted).await.unwrap();

        let removed = service.cancel_all().await.unwrap();
        let mut ids: Vec<u64> = removed.iter().map(|e| e.message_id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        assert!(service.list_active().await.unwrap().is_empty());

        let err = service.set_rsvp(1, 7, SignupStatus::Accepted).await.unwrap_err();
        assert!(matches!(err, EventError::UnknownEvent(1)));
    }

    #[tokio::test]
    async fn test_refresh_views_skips_failures() {
        let (service, platform, _) = service(5).await;
        let due = Utc::now() + chrono::Duration::hours(1);
        service.create_event(1, 9, due).await.unwrap();
        service.create_event(2, 9, due).await.unwrap();
        service.set_rsvp(2, 7, SignupStatus::Accepted).await.unwrap();
        platform.mark_missing(1);

        let refreshed = service.refresh_views(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(refreshed, 1);
        assert!(platform.calls().contains(&PlatformCall::EditView {
            message_id: 2,
            accepted: 1,
            declined: 0,
        }));
    }
}
